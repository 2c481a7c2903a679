use super::{ItineraryStore, PersistenceError, PersistenceResult};
use crate::itinerary::SavedItinerary;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteItineraryStore {
    connection: Mutex<Connection>,
}

impl SqliteItineraryStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS saved_itineraries (
                owner TEXT PRIMARY KEY,
                saved_at TEXT NOT NULL,
                itinerary_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }
}

impl ItineraryStore for SqliteItineraryStore {
    fn save_itinerary(&self, owner: &str, saved: &SavedItinerary) -> PersistenceResult<()> {
        super::validate_itinerary(&saved.itinerary)?;
        let json = serde_json::to_string(saved)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO saved_itineraries (owner, saved_at, itinerary_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner) DO UPDATE SET saved_at = excluded.saved_at,
                                              itinerary_json = excluded.itinerary_json",
            params![owner, saved.saved_at.to_rfc3339(), json],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_itinerary(&self, owner: &str) -> PersistenceResult<Option<SavedItinerary>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT itinerary_json FROM saved_itineraries WHERE owner = ?1")?;
        let json: Option<String> = stmt
            .query_row(params![owner], |row| row.get(0))
            .optional()?;

        let Some(json) = json else {
            return Ok(None);
        };
        let saved: SavedItinerary = serde_json::from_str(&json)?;
        super::validate_itinerary(&saved.itinerary)?;
        Ok(Some(saved))
    }

    fn clear_itinerary(&self, owner: &str) -> PersistenceResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM saved_itineraries WHERE owner = ?1",
            params![owner],
        )?;
        Ok(removed > 0)
    }
}

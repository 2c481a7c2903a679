use crate::conflict;
use crate::itinerary::{ItinerarySnapshot, SavedItinerary};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Where saved itineraries go. Keyed by owner so several travellers can
/// share one backing store.
pub trait ItineraryStore {
    fn save_itinerary(&self, owner: &str, saved: &SavedItinerary) -> PersistenceResult<()>;
    fn load_itinerary(&self, owner: &str) -> PersistenceResult<Option<SavedItinerary>>;
    /// Returns `false` when nothing was stored for `owner`.
    fn clear_itinerary(&self, owner: &str) -> PersistenceResult<bool>;
}

/// Structural checks run before anything is written or after it is read:
/// day numbering, ordering within a day, valid ranges, no double booking
/// among unflagged visits.
pub fn validate_itinerary(itinerary: &ItinerarySnapshot) -> PersistenceResult<()> {
    for (idx, day) in itinerary.itinerary_by_day.iter().enumerate() {
        let expected = idx as u32 + 1;
        for visit in day {
            if visit.day != expected {
                return Err(PersistenceError::InvalidData(format!(
                    "visit {} is listed under day {} but scheduled on day {}",
                    visit.attraction_id, expected, visit.day
                )));
            }
            if visit.start >= visit.end {
                return Err(PersistenceError::InvalidData(format!(
                    "visit {} has start {} not before end {}",
                    visit.attraction_id, visit.start, visit.end
                )));
            }
            if !visit.fee.is_finite() || visit.fee < 0.0 {
                return Err(PersistenceError::InvalidData(format!(
                    "visit {} has invalid fee {}",
                    visit.attraction_id, visit.fee
                )));
            }
        }
        if day.windows(2).any(|pair| pair[0].start > pair[1].start) {
            return Err(PersistenceError::InvalidData(format!(
                "day {} is not sorted by start time",
                expected
            )));
        }
    }

    let visits = itinerary.to_visit_map();
    if visits.len() != itinerary.visit_count() {
        return Err(PersistenceError::InvalidData(
            "an attraction appears more than once in the itinerary".into(),
        ));
    }
    // Flagged visits were knowingly placed over a clash.
    let settled = visits.values().filter(|v| !v.flagged);
    if let Some((a, b)) = conflict::double_bookings(settled).first() {
        return Err(PersistenceError::InvalidData(format!(
            "visits {} and {} overlap on day {}",
            a.attraction_id, b.attraction_id, a.day
        )));
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonDirectoryStore, load_itinerary_from_csv, load_itinerary_from_json,
    load_planner_state_from_json, save_itinerary_to_csv, save_itinerary_to_json,
    save_planner_state_to_json,
};

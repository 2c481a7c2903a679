use super::{ItineraryStore, PersistenceError, PersistenceResult};
use crate::clock::TimeOfDay;
use crate::itinerary::{ItinerarySnapshot, SavedItinerary, ScheduledVisit};
use crate::planner::PlannerState;
use crate::visit::AttractionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub fn save_itinerary_to_json<P: AsRef<Path>>(
    saved: &SavedItinerary,
    path: P,
) -> PersistenceResult<()> {
    super::validate_itinerary(&saved.itinerary)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, saved)?;
    Ok(())
}

pub fn load_itinerary_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SavedItinerary> {
    let file = File::open(path)?;
    let saved: SavedItinerary = serde_json::from_reader(file)?;
    super::validate_itinerary(&saved.itinerary)?;
    Ok(saved)
}

pub fn save_planner_state_to_json<P: AsRef<Path>>(
    state: &PlannerState,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, state)?;
    Ok(())
}

pub fn load_planner_state_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlannerState> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Default, Serialize, Deserialize)]
struct VisitCsvRecord {
    day: u32,
    attraction_id: String,
    name: String,
    start: String,
    end: String,
    fee: String,
    flagged: String,
    #[serde(default)]
    saved_at: String,
    #[serde(default)]
    num_days: String,
}

impl From<&ScheduledVisit> for VisitCsvRecord {
    fn from(visit: &ScheduledVisit) -> Self {
        VisitCsvRecord {
            day: visit.day,
            attraction_id: visit.attraction_id.to_string(),
            name: visit.name.clone(),
            start: visit.start.to_string(),
            end: visit.end.to_string(),
            fee: visit.fee.to_string(),
            flagged: visit.flagged.to_string(),
            ..VisitCsvRecord::default()
        }
    }
}

impl VisitCsvRecord {
    fn metadata_row(saved: &SavedItinerary) -> Self {
        VisitCsvRecord {
            name: "__metadata__".to_string(),
            saved_at: saved.saved_at.to_rfc3339(),
            num_days: saved.itinerary.num_days().to_string(),
            ..VisitCsvRecord::default()
        }
    }

    fn is_metadata_row(&self) -> bool {
        !self.saved_at.trim().is_empty()
    }

    fn into_visit(self) -> PersistenceResult<ScheduledVisit> {
        if self.attraction_id.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "visit row is missing an attraction id".into(),
            ));
        }
        Ok(ScheduledVisit {
            attraction_id: AttractionId::new(self.attraction_id),
            name: self.name,
            day: self.day,
            start: parse_time(&self.start)?,
            end: parse_time(&self.end)?,
            fee: parse_f64(&self.fee)?,
            flagged: parse_bool(&self.flagged)?,
        })
    }
}

/// Writes one row per visit, preceded by a metadata row carrying the save
/// time and day count.
pub fn save_itinerary_to_csv<P: AsRef<Path>>(
    saved: &SavedItinerary,
    path: P,
) -> PersistenceResult<()> {
    super::validate_itinerary(&saved.itinerary)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(VisitCsvRecord::metadata_row(saved))?;
    for visit in saved.itinerary.visits() {
        writer.serialize(VisitCsvRecord::from(visit))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_itinerary_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<SavedItinerary> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut meta: Option<(DateTime<Utc>, usize)> = None;
    let mut visits = Vec::new();
    for record in reader.deserialize::<VisitCsvRecord>() {
        let record = record?;
        if record.is_metadata_row() {
            if meta.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple metadata rows".into(),
                ));
            }
            let saved_at = DateTime::parse_from_rfc3339(record.saved_at.trim())
                .map_err(|e| {
                    PersistenceError::InvalidData(format!(
                        "invalid saved_at '{}': {e}",
                        record.saved_at
                    ))
                })?
                .with_timezone(&Utc);
            let num_days = record.num_days.trim().parse::<usize>().map_err(|e| {
                PersistenceError::InvalidData(format!("invalid num_days '{}': {e}", record.num_days))
            })?;
            meta = Some((saved_at, num_days));
            continue;
        }
        visits.push(record.into_visit()?);
    }

    let Some((saved_at, num_days)) = meta else {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no metadata row".into(),
        ));
    };

    let mut itinerary_by_day: Vec<Vec<ScheduledVisit>> = vec![Vec::new(); num_days];
    for visit in visits {
        let bucket = visit
            .day
            .checked_sub(1)
            .and_then(|idx| itinerary_by_day.get_mut(idx as usize))
            .ok_or_else(|| {
                PersistenceError::InvalidData(format!(
                    "visit {} is on day {} outside 1..={}",
                    visit.attraction_id, visit.day, num_days
                ))
            })?;
        bucket.push(visit);
    }
    let total_fee = itinerary_by_day.iter().flatten().map(|v| v.fee).sum();
    let itinerary = ItinerarySnapshot {
        itinerary_by_day,
        total_fee,
    };
    super::validate_itinerary(&itinerary)?;
    Ok(itinerary.stamp(saved_at))
}

/// One pretty-printed JSON file per owner inside `root`.
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, owner: &str) -> PersistenceResult<PathBuf> {
        let valid = !owner.is_empty()
            && owner
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !owner.starts_with('.');
        if !valid {
            return Err(PersistenceError::InvalidData(format!(
                "owner '{owner}' cannot be used as a file name"
            )));
        }
        Ok(self.root.join(format!("saved_itinerary_{owner}.json")))
    }
}

impl ItineraryStore for JsonDirectoryStore {
    fn save_itinerary(&self, owner: &str, saved: &SavedItinerary) -> PersistenceResult<()> {
        save_itinerary_to_json(saved, self.path_for(owner)?)
    }

    fn load_itinerary(&self, owner: &str) -> PersistenceResult<Option<SavedItinerary>> {
        let path = self.path_for(owner)?;
        if !path.exists() {
            return Ok(None);
        }
        load_itinerary_from_json(path).map(Some)
    }

    fn clear_itinerary(&self, owner: &str) -> PersistenceResult<bool> {
        let path = self.path_for(owner)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

fn parse_time(input: &str) -> PersistenceResult<TimeOfDay> {
    input
        .trim()
        .parse::<TimeOfDay>()
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

fn parse_f64(input: &str) -> PersistenceResult<f64> {
    if input.trim().is_empty() {
        return Ok(0.0);
    }
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| PersistenceError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

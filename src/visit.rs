use crate::clock::TimeOfDay;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttractionId(String);

impl AttractionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AttractionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AttractionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A candidate window on a 1-based trip day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub day: u32,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Slot {
    pub fn new(day: u32, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { day, start, end }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {}-{}", self.day, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub attraction_id: AttractionId,
    pub day: u32,
    #[serde(rename = "visit_start_time")]
    pub start: TimeOfDay,
    #[serde(rename = "visit_end_time")]
    pub end: TimeOfDay,
    /// Set when no conflict-free slot fit inside opening hours.
    #[serde(default)]
    pub flagged: bool,
}

impl Visit {
    pub fn new(attraction_id: AttractionId, slot: Slot) -> Self {
        Self {
            attraction_id,
            day: slot.day,
            start: slot.start,
            end: slot.end,
            flagged: false,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.start, self.end)
    }
}

/// Visits keyed by attraction. Ordered so that iteration and serialization
/// are stable across runs.
pub type VisitMap = BTreeMap<AttractionId, Visit>;

use crate::attraction::Attraction;
use crate::clock::{OpeningHours, TimeOfDay};
use crate::conflict;
use crate::visit::{AttractionId, Slot, Visit, VisitMap};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("attraction {0} is not in the catalog")]
    UnknownAttraction(AttractionId),
    #[error("attraction {0} is not part of the itinerary")]
    NotScheduled(AttractionId),
    #[error("day {day} is outside the trip (1..={num_days})")]
    DayOutOfRange { day: u32, num_days: u32 },
    #[error("start time {start} must be before end time {end}")]
    InvalidRange { start: TimeOfDay, end: TimeOfDay },
    #[error("visit time must be within opening hours: {open} to {close}")]
    OutsideOpeningHours { open: TimeOfDay, close: TimeOfDay },
    #[error("time conflicts with {other} ({other_start}-{other_end}) on day {day}")]
    TimeConflict {
        day: u32,
        other: AttractionId,
        other_start: TimeOfDay,
        other_end: TimeOfDay,
    },
}

/// Moves a scheduled attraction to `slot` after checking range, opening
/// hours and clashes, in that order. `visits` is only written on success.
/// Attractions without their own hours are checked against `default_hours`.
pub fn apply_override(
    attraction_id: &AttractionId,
    slot: Slot,
    visits: &mut VisitMap,
    catalog: &[Attraction],
    default_hours: OpeningHours,
) -> Result<Visit, OverrideError> {
    let attraction = catalog
        .iter()
        .find(|a| a.id == *attraction_id)
        .ok_or_else(|| OverrideError::UnknownAttraction(attraction_id.clone()))?;
    if !visits.contains_key(attraction_id) {
        return Err(OverrideError::NotScheduled(attraction_id.clone()));
    }

    if slot.start >= slot.end {
        return Err(OverrideError::InvalidRange {
            start: slot.start,
            end: slot.end,
        });
    }

    let hours = attraction.hours(default_hours);
    if !conflict::within_opening_hours(&slot, hours) {
        return Err(OverrideError::OutsideOpeningHours {
            open: hours.open(),
            close: hours.close(),
        });
    }

    if let Some(other) = conflict::find_conflict(&slot, visits.values(), Some(attraction_id)) {
        return Err(OverrideError::TimeConflict {
            day: slot.day,
            other: other.attraction_id.clone(),
            other_start: other.start,
            other_end: other.end,
        });
    }

    let visit = Visit::new(attraction_id.clone(), slot);
    visits.insert(attraction_id.clone(), visit.clone());
    info!(attraction = %attraction_id, slot = %slot, "manual override applied");
    Ok(visit)
}

use crate::attraction::Attraction;
use crate::clock::OpeningHours;
use crate::config::PlannerConfig;
use crate::conflict;
use crate::visit::{AttractionId, Slot, Visit, VisitMap};
use crate::weather::{self, DayWeather};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Raised when an attraction could only be placed by ignoring conflicts or
/// its closing time. The visit is still scheduled and carries `flagged`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error(
    "no conflict-free slot for attraction {attraction_id} on day {day}; placed at opening time"
)]
pub struct UnplaceableAttraction {
    pub attraction_id: AttractionId,
    pub day: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    pub visits: VisitMap,
    pub warnings: Vec<UnplaceableAttraction>,
    /// Previously scheduled attractions that are no longer selected.
    pub removed: Vec<AttractionId>,
    /// Selected ids with no catalog entry; they are not scheduled.
    pub missing: Vec<AttractionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAllocator {
    slot_step_minutes: u32,
    default_visit_minutes: u32,
    default_opening_hours: OpeningHours,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl SlotAllocator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            slot_step_minutes: config.slot_step_minutes.max(1),
            default_visit_minutes: config.default_visit_minutes.max(1),
            default_opening_hours: config.default_opening_hours,
        }
    }

    /// Assigns every selected attraction a day and a time window.
    ///
    /// Outdoor attractions go first, each onto the least-loaded good-weather
    /// day (or the least-loaded day overall when the whole trip is bad), then
    /// indoor and mixed attractions onto the least-loaded day. Load ties go to
    /// the earliest day. The pass always starts from an empty schedule, so
    /// `existing` only determines which visits are reported as removed.
    pub fn allocate(
        &self,
        selected: &[AttractionId],
        catalog: &[Attraction],
        weather: &[DayWeather],
        num_days: u32,
        existing: &VisitMap,
    ) -> Allocation {
        let num_days = num_days.max(1);
        let by_id: HashMap<&AttractionId, &Attraction> =
            catalog.iter().map(|a| (&a.id, a)).collect();

        let mut seen = HashSet::with_capacity(selected.len());
        let mut outdoor = Vec::new();
        let mut indoor = Vec::new();
        let mut missing = Vec::new();
        for id in selected {
            if !seen.insert(id) {
                continue;
            }
            match by_id.get(id) {
                Some(attraction) if attraction.setting.is_weather_sensitive() => {
                    outdoor.push(*attraction)
                }
                Some(attraction) => indoor.push(*attraction),
                None => missing.push(id.clone()),
            }
        }

        let good = weather::good_days(weather, num_days);
        let mut load = vec![0usize; num_days as usize];
        let mut allocation = Allocation {
            missing,
            ..Allocation::default()
        };

        for attraction in outdoor {
            let day_idx = least_loaded(&load, |d| good[d])
                .or_else(|| least_loaded(&load, |_| true))
                .unwrap_or(0);
            self.place(attraction, day_idx, &mut load, &mut allocation);
        }
        for attraction in indoor {
            let day_idx = least_loaded(&load, |_| true).unwrap_or(0);
            self.place(attraction, day_idx, &mut load, &mut allocation);
        }

        allocation.removed = existing
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();

        debug!(
            placed = allocation.visits.len(),
            flagged = allocation.warnings.len(),
            removed = allocation.removed.len(),
            missing = allocation.missing.len(),
            num_days,
            "allocation pass complete"
        );
        allocation
    }

    fn place(
        &self,
        attraction: &Attraction,
        day_idx: usize,
        load: &mut [usize],
        allocation: &mut Allocation,
    ) {
        let day = day_idx as u32 + 1;
        let visit = self.find_slot(attraction, day, &allocation.visits);
        if visit.flagged {
            warn!(
                attraction = %attraction.id,
                day,
                hours = %attraction.hours(self.default_opening_hours),
                "no conflict-free slot inside opening hours"
            );
            allocation.warnings.push(UnplaceableAttraction {
                attraction_id: attraction.id.clone(),
                day,
            });
        }
        load[day_idx] += 1;
        allocation.visits.insert(attraction.id.clone(), visit);
    }

    /// First step-aligned window from opening time that fits before closing
    /// and clashes with nothing already on `day`.
    pub fn find_slot(&self, attraction: &Attraction, day: u32, visits: &VisitMap) -> Visit {
        let hours = attraction.hours(self.default_opening_hours);
        let duration = attraction.visit_minutes(self.default_visit_minutes);
        let same_day: Vec<&Visit> = visits.values().filter(|v| v.day == day).collect();

        let mut start = hours.open();
        while let Some(end) = start.checked_add(duration).filter(|end| *end <= hours.close()) {
            let candidate = Slot::new(day, start, end);
            if !conflict::overlaps(&candidate, same_day.iter().copied(), Some(&attraction.id)) {
                return Visit::new(attraction.id.clone(), candidate);
            }
            match start.checked_add(self.slot_step_minutes) {
                Some(next) => start = next,
                None => break,
            }
        }

        let end = hours.open().saturating_add(duration).min(hours.close());
        let mut visit = Visit::new(attraction.id.clone(), Slot::new(day, hours.open(), end));
        visit.flagged = true;
        visit
    }
}

/// Index of the eligible day with the fewest visits, earliest on ties.
fn least_loaded<F>(load: &[usize], eligible: F) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    load.iter()
        .enumerate()
        .filter(|(d, _)| eligible(*d))
        .min_by_key(|(d, count)| (**count, *d))
        .map(|(d, _)| d)
}

/// Runs a pass with the default allocator settings.
pub fn allocate(
    selected: &[AttractionId],
    catalog: &[Attraction],
    weather: &[DayWeather],
    num_days: u32,
    existing: &VisitMap,
) -> Allocation {
    SlotAllocator::default().allocate(selected, catalog, weather, num_days, existing)
}

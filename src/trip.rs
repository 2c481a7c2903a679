use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "requested {requested} planning days but the stay is only {stay_days} days; using {stay_days}"
)]
pub struct RequestedDaysExceedStay {
    pub requested: u32,
    pub stay_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripWindow {
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl TripWindow {
    pub fn new(arrival: NaiveDate, departure: NaiveDate) -> Self {
        Self { arrival, departure }
    }

    /// Whole days between arrival and departure, never less than one.
    pub fn stay_days(&self) -> u32 {
        let diff = (self.departure - self.arrival).num_days();
        if diff > 0 {
            u32::try_from(diff).unwrap_or(u32::MAX)
        } else {
            1
        }
    }

    /// Calendar date of a 1-based trip day.
    pub fn date_of_day(&self, day: u32) -> NaiveDate {
        self.arrival + Duration::days(i64::from(day.saturating_sub(1)))
    }

    /// Brings a requested day count into `1..=stay_days`.
    pub fn clamp_days(&self, requested: u32) -> (u32, Option<RequestedDaysExceedStay>) {
        let stay_days = self.stay_days();
        if requested > stay_days {
            return (
                stay_days,
                Some(RequestedDaysExceedStay {
                    requested,
                    stay_days,
                }),
            );
        }
        (requested.max(1), None)
    }
}

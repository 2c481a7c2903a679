use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),
    #[error("minute value {0} is outside a single day")]
    OutOfRange(u32),
    #[error("invalid opening hours '{0}' (expected HH:MM-HH:MM)")]
    InvalidHours(String),
    #[error("opening time {open} must be before closing time {close}")]
    OpenNotBeforeClose { open: TimeOfDay, close: TimeOfDay },
}

/// Minutes since midnight. `24:00` is accepted as an end-of-day bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    pub fn from_minutes(minutes: u32) -> Result<Self, ClockError> {
        if minutes > MINUTES_PER_DAY {
            return Err(ClockError::OutOfRange(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn hm(hour: u32, minute: u32) -> Result<Self, ClockError> {
        if minute >= 60 {
            return Err(ClockError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Adds `minutes`, saturating at the end of the day.
    pub fn saturating_add(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes).min(MINUTES_PER_DAY))
    }

    pub fn checked_add(self, minutes: u32) -> Option<Self> {
        let total = self.0.checked_add(minutes)?;
        (total <= MINUTES_PER_DAY).then_some(Self(total))
    }

    pub fn checked_sub(self, minutes: u32) -> Option<Self> {
        self.0.checked_sub(minutes).map(Self)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ClockError::InvalidTime(trimmed.to_string());
        let (h, m) = trimmed.split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.trim().parse().map_err(|_| invalid())?;
        let minute: u32 = m.trim().parse().map_err(|_| invalid())?;
        if minute >= 60 {
            return Err(invalid());
        }
        Self::from_minutes(hour * 60 + minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Daily opening window of an attraction. Always `open < close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpeningHours {
    open: TimeOfDay,
    close: TimeOfDay,
}

impl OpeningHours {
    pub fn new(open: TimeOfDay, close: TimeOfDay) -> Result<Self, ClockError> {
        if open >= close {
            return Err(ClockError::OpenNotBeforeClose { open, close });
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> TimeOfDay {
        self.open
    }

    pub fn close(&self) -> TimeOfDay {
        self.close
    }

    pub fn span_minutes(&self) -> u32 {
        self.close.minutes() - self.open.minutes()
    }

    /// Parses a daily-hours string, using `fallback` when it is missing or
    /// malformed.
    pub fn parse_or(daily: Option<&str>, fallback: OpeningHours) -> OpeningHours {
        daily
            .and_then(|s| s.parse::<OpeningHours>().ok())
            .unwrap_or(fallback)
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self {
            open: TimeOfDay(9 * 60),
            close: TimeOfDay(18 * 60),
        }
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.open, self.close)
    }
}

impl FromStr for OpeningHours {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(['-', '–']).collect();
        if parts.len() != 2 {
            return Err(ClockError::InvalidHours(s.to_string()));
        }
        let open = parts[0]
            .parse::<TimeOfDay>()
            .map_err(|_| ClockError::InvalidHours(s.to_string()))?;
        let close = parts[1]
            .parse::<TimeOfDay>()
            .map_err(|_| ClockError::InvalidHours(s.to_string()))?;
        Self::new(open, close)
    }
}

impl TryFrom<String> for OpeningHours {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OpeningHours> for String {
    fn from(value: OpeningHours) -> Self {
        value.to_string()
    }
}

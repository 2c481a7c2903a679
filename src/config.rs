use crate::attraction::Nationality;
use crate::clock::OpeningHours;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "TRIP_PLANNER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Increment between candidate start times during slot search.
    pub slot_step_minutes: u32,
    /// Visit length for attractions that do not report one.
    pub default_visit_minutes: u32,
    pub default_opening_hours: OpeningHours,
    pub default_nationality: Nationality,
    pub default_num_persons: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            slot_step_minutes: 30,
            default_visit_minutes: 60,
            default_opening_hours: OpeningHours::default(),
            default_nationality: Nationality::Indian,
            default_num_persons: 1,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_step_minutes == 0 {
            return Err(ConfigError::Invalid(
                "slot_step_minutes must be greater than zero".into(),
            ));
        }
        if self.default_visit_minutes == 0 {
            return Err(ConfigError::Invalid(
                "default_visit_minutes must be greater than zero".into(),
            ));
        }
        if self.default_num_persons == 0 {
            return Err(ConfigError::Invalid(
                "default_num_persons must be at least one".into(),
            ));
        }
        Ok(())
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: PlannerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Loads the file named by `TRIP_PLANNER_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::default()),
        }
    }
}

//! Boundaries to the attraction database and the weather provider.
//!
//! Both are owned outside the scheduler; the planner only ever reads an
//! immutable snapshot from them per allocation pass.

use crate::attraction::{Attraction, AttractionValidationError, validate_catalog};
use crate::weather::{DailyConditions, DayWeather};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no attractions known for city '{0}'")]
    UnknownCity(String),
    #[error("forecast range {start}..{end} is empty")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(#[from] AttractionValidationError),
}

pub trait AttractionCatalog {
    fn list_attractions(&self, city: &str) -> Result<Vec<Attraction>, CatalogError>;
}

pub trait WeatherOracle {
    /// One entry per day from `start` to `end` inclusive, indexed by offset
    /// from `start`.
    fn daily_forecast(
        &self,
        city: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, CatalogError>;
}

fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

/// City-keyed attraction lists held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    cities: HashMap<String, Vec<Attraction>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_city(
        &mut self,
        city: &str,
        attractions: Vec<Attraction>,
    ) -> Result<(), CatalogError> {
        validate_catalog(&attractions)?;
        self.cities.insert(city_key(city), attractions);
        Ok(())
    }

    /// Reads `{ "<city>": [attraction, ...], ... }`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        let raw: HashMap<String, Vec<Attraction>> = serde_json::from_reader(file)?;
        let mut catalog = Self::new();
        for (city, attractions) in raw {
            catalog.insert_city(&city, attractions)?;
        }
        Ok(catalog)
    }

    pub fn cities(&self) -> Vec<&str> {
        let mut cities: Vec<&str> = self.cities.keys().map(String::as_str).collect();
        cities.sort_unstable();
        cities
    }
}

impl AttractionCatalog for StaticCatalog {
    fn list_attractions(&self, city: &str) -> Result<Vec<Attraction>, CatalogError> {
        self.cities
            .get(&city_key(city))
            .cloned()
            .ok_or_else(|| CatalogError::UnknownCity(city.to_string()))
    }
}

/// Per-city daily conditions; dates without data are reported as good.
#[derive(Debug, Clone, Default)]
pub struct StaticForecast {
    cities: HashMap<String, BTreeMap<NaiveDate, DayWeather>>,
}

impl StaticForecast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_conditions<I>(&mut self, city: &str, conditions: I)
    where
        I: IntoIterator<Item = DailyConditions>,
    {
        let days = self.cities.entry(city_key(city)).or_default();
        for entry in conditions {
            days.insert(entry.date, entry.classify());
        }
    }

    pub fn insert_day(&mut self, city: &str, date: NaiveDate, weather: DayWeather) {
        self.cities
            .entry(city_key(city))
            .or_default()
            .insert(date, weather);
    }
}

impl WeatherOracle for StaticForecast {
    fn daily_forecast(
        &self,
        city: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DayWeather>, CatalogError> {
        if end < start {
            return Err(CatalogError::EmptyRange { start, end });
        }
        let known = self.cities.get(&city_key(city));
        let mut forecast = Vec::new();
        let mut date = start;
        while date <= end {
            let weather = known
                .and_then(|days| days.get(&date).copied())
                .unwrap_or_default();
            forecast.push(weather);
            date += Duration::days(1);
        }
        Ok(forecast)
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const COLD_LIMIT_C: f64 = 10.0;
pub const HEAT_LIMIT_C: f64 = 35.0;
const ADVERSE_CONDITIONS: [&str; 4] = ["rain", "storm", "snow", "shower"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWeather {
    pub is_bad: bool,
}

impl DayWeather {
    pub fn good() -> Self {
        Self { is_bad: false }
    }

    pub fn bad() -> Self {
        Self { is_bad: true }
    }
}

/// Raw forecast for one date as reported by a weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyConditions {
    pub date: NaiveDate,
    /// Precipitation in millimetres.
    #[serde(default)]
    pub rain: f64,
    /// Average temperature in degrees Celsius.
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl DailyConditions {
    pub fn classify(&self) -> DayWeather {
        let adverse_text = self.condition.as_deref().is_some_and(|text| {
            let lower = text.to_lowercase();
            ADVERSE_CONDITIONS.iter().any(|word| lower.contains(word))
        });
        DayWeather {
            is_bad: self.rain > 0.0
                || self.temp < COLD_LIMIT_C
                || self.temp > HEAT_LIMIT_C
                || adverse_text,
        }
    }
}

/// `true` for every day that is fit for outdoor plans. Days without a
/// forecast count as good.
pub fn good_days(weather: &[DayWeather], num_days: u32) -> Vec<bool> {
    (0..num_days as usize)
        .map(|d| weather.get(d).is_none_or(|w| !w.is_bad))
        .collect()
}

use crate::clock::OpeningHours;
use crate::visit::AttractionId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const MIN_CUSTOM_VISIT_MINUTES: u32 = 15;
pub const MAX_CUSTOM_VISIT_MINUTES: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Setting {
    Indoor,
    Outdoor,
    Both,
}

impl Setting {
    /// Only purely outdoor attractions carry a weather constraint.
    pub fn is_weather_sensitive(self) -> bool {
        matches!(self, Setting::Outdoor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Setting::Indoor => "indoor",
            Setting::Outdoor => "outdoor",
            Setting::Both => "both",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Nationality {
    #[default]
    Indian,
    Foreigner,
}

impl Nationality {
    pub fn as_str(self) -> &'static str {
        match self {
            Nationality::Indian => "indian",
            Nationality::Foreigner => "foreigner",
        }
    }
}

impl fmt::Display for Nationality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Nationality {
    type Err = AttractionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indian" => Ok(Nationality::Indian),
            "foreigner" | "foreign" => Ok(Nationality::Foreigner),
            other => Err(AttractionValidationError::new(format!(
                "unknown nationality '{other}'"
            ))),
        }
    }
}

/// Entry fee per person, by nationality tier. A missing tier is free.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryFee(BTreeMap<Nationality, f64>);

impl EntryFee {
    pub fn new<I>(tiers: I) -> Self
    where
        I: IntoIterator<Item = (Nationality, f64)>,
    {
        Self(tiers.into_iter().collect())
    }

    pub fn per_person(&self, nationality: Nationality) -> f64 {
        self.0.get(&nationality).copied().unwrap_or(0.0)
    }

    pub fn tiers(&self) -> impl Iterator<Item = (Nationality, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: AttractionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    /// Daily hours as listed by the catalog. Missing or unreadable hours are
    /// stored as `None` and resolved with [`Attraction::hours`].
    #[serde(
        default,
        deserialize_with = "lenient_hours",
        skip_serializing_if = "Option::is_none"
    )]
    pub opening_hours: Option<OpeningHours>,
    /// Average visit length in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_visit_duration: Option<u32>,
    #[serde(rename = "indoor_outdoor")]
    pub setting: Setting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_fee: Option<EntryFee>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Attraction {
    pub fn new(id: impl Into<AttractionId>, name: impl Into<String>, setting: Setting) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            address: String::new(),
            opening_hours: None,
            avg_visit_duration: None,
            setting,
            entry_fee: None,
            tags: Vec::new(),
        }
    }

    pub fn with_hours(mut self, opening_hours: OpeningHours) -> Self {
        self.opening_hours = Some(opening_hours);
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.avg_visit_duration = Some(minutes);
        self
    }

    pub fn with_fee(mut self, fee: EntryFee) -> Self {
        self.entry_fee = Some(fee);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn hours(&self, fallback: OpeningHours) -> OpeningHours {
        self.opening_hours.unwrap_or(fallback)
    }

    /// Visit length, falling back to `default_minutes` when unset or zero.
    pub fn visit_minutes(&self, default_minutes: u32) -> u32 {
        match self.avg_visit_duration {
            Some(minutes) if minutes > 0 => minutes,
            _ => default_minutes,
        }
    }

    pub fn fee_per_person(&self, nationality: Nationality) -> f64 {
        self.entry_fee
            .as_ref()
            .map(|fee| fee.per_person(nationality))
            .unwrap_or(0.0)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

fn lenient_hours<'de, D>(deserializer: D) -> Result<Option<OpeningHours>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|daily| match daily.parse::<OpeningHours>() {
        Ok(hours) => Some(hours),
        Err(err) => {
            warn!(%err, "unreadable opening hours; using the configured default");
            None
        }
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractionFilters {
    #[serde(default)]
    pub avoid_crowd: bool,
    #[serde(default)]
    pub indoor_only: bool,
    #[serde(default)]
    pub photography_only: bool,
}

impl AttractionFilters {
    pub fn matches(&self, attraction: &Attraction) -> bool {
        if self.avoid_crowd && attraction.has_tag("crowded") {
            return false;
        }
        if self.indoor_only && attraction.setting != Setting::Indoor {
            return false;
        }
        if self.photography_only && !attraction.has_tag("photography") {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, attractions: &'a [Attraction]) -> Vec<&'a Attraction> {
        attractions.iter().filter(|a| self.matches(a)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AttractionValidationError {
    message: String,
}

impl AttractionValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Checks a user-entered place before it joins the catalog.
pub fn validate_custom_attraction(attraction: &Attraction) -> Result<(), AttractionValidationError> {
    if attraction.id.as_str().trim().is_empty() {
        return Err(AttractionValidationError::new("place id is required"));
    }
    for (field, value) in [
        ("name", &attraction.name),
        ("description", &attraction.description),
        ("address", &attraction.address),
    ] {
        if value.trim().is_empty() {
            return Err(AttractionValidationError::new(format!(
                "place {} is required",
                field
            )));
        }
    }

    if let Some(fee) = &attraction.entry_fee {
        for (nationality, amount) in fee.tiers() {
            if !amount.is_finite() || amount < 0.0 {
                return Err(AttractionValidationError::new(format!(
                    "place {} has invalid {} entry fee {}",
                    attraction.id, nationality, amount
                )));
            }
        }
    }

    if let Some(minutes) = attraction.avg_visit_duration {
        if !(MIN_CUSTOM_VISIT_MINUTES..=MAX_CUSTOM_VISIT_MINUTES).contains(&minutes) {
            return Err(AttractionValidationError::new(format!(
                "place {} visit duration {} must be between {} and {} minutes",
                attraction.id, minutes, MIN_CUSTOM_VISIT_MINUTES, MAX_CUSTOM_VISIT_MINUTES
            )));
        }
    }

    Ok(())
}

/// Rejects duplicate ids within one catalog snapshot.
pub fn validate_catalog(attractions: &[Attraction]) -> Result<(), AttractionValidationError> {
    let mut seen = std::collections::HashSet::with_capacity(attractions.len());
    for attraction in attractions {
        if !seen.insert(&attraction.id) {
            return Err(AttractionValidationError::new(format!(
                "duplicate attraction id {}",
                attraction.id
            )));
        }
    }
    Ok(())
}

use crate::attraction::{Attraction, Nationality};
use crate::clock::TimeOfDay;
use crate::visit::{AttractionId, Visit, VisitMap};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A visit as shown on the day-by-day plan, with its computed fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledVisit {
    pub attraction_id: AttractionId,
    pub name: String,
    pub day: u32,
    #[serde(rename = "visit_start_time")]
    pub start: TimeOfDay,
    #[serde(rename = "visit_end_time")]
    pub end: TimeOfDay,
    #[serde(rename = "calculated_fees")]
    pub fee: f64,
    #[serde(default)]
    pub flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySnapshot {
    pub itinerary_by_day: Vec<Vec<ScheduledVisit>>,
    pub total_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItinerary {
    #[serde(flatten)]
    pub itinerary: ItinerarySnapshot,
    pub saved_at: DateTime<Utc>,
}

impl ItinerarySnapshot {
    pub fn num_days(&self) -> usize {
        self.itinerary_by_day.len()
    }

    pub fn day(&self, day: u32) -> &[ScheduledVisit] {
        day.checked_sub(1)
            .and_then(|idx| self.itinerary_by_day.get(idx as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn visits(&self) -> impl Iterator<Item = &ScheduledVisit> {
        self.itinerary_by_day.iter().flatten()
    }

    pub fn visit_count(&self) -> usize {
        self.itinerary_by_day.iter().map(Vec::len).sum()
    }

    pub fn flagged(&self) -> Vec<&ScheduledVisit> {
        self.visits().filter(|v| v.flagged).collect()
    }

    /// How often each place occurs across the plan, by name.
    pub fn place_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for visit in self.visits() {
            *counts.entry(visit.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_visit_map(&self) -> VisitMap {
        self.visits()
            .map(|v| {
                (
                    v.attraction_id.clone(),
                    Visit {
                        attraction_id: v.attraction_id.clone(),
                        day: v.day,
                        start: v.start,
                        end: v.end,
                        flagged: v.flagged,
                    },
                )
            })
            .collect()
    }

    pub fn stamp(self, saved_at: DateTime<Utc>) -> SavedItinerary {
        SavedItinerary {
            itinerary: self,
            saved_at,
        }
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let rows: Vec<&ScheduledVisit> = self.visits().collect();
        let days: Vec<i32> = rows.iter().map(|v| v.day as i32).collect();
        let starts: Vec<String> = rows.iter().map(|v| v.start.to_string()).collect();
        let ends: Vec<String> = rows.iter().map(|v| v.end.to_string()).collect();
        let ids: Vec<&str> = rows.iter().map(|v| v.attraction_id.as_str()).collect();
        let names: Vec<&str> = rows.iter().map(|v| v.name.as_str()).collect();
        let fees: Vec<f64> = rows.iter().map(|v| v.fee).collect();
        let flagged: Vec<bool> = rows.iter().map(|v| v.flagged).collect();

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("day"), days).into_column(),
            Series::new(PlSmallStr::from_static("start"), starts).into_column(),
            Series::new(PlSmallStr::from_static("end"), ends).into_column(),
            Series::new(PlSmallStr::from_static("attraction_id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("fee"), fees).into_column(),
            Series::new(PlSmallStr::from_static("flagged"), flagged).into_column(),
        ];
        DataFrame::new(columns)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("days={}", self.num_days()));
        parts.push(format!("visits={}", self.visit_count()));
        parts.push(format!("total_fee={}", self.total_fee));
        let flagged = self.flagged();
        if !flagged.is_empty() {
            let ids = flagged
                .iter()
                .map(|v| v.attraction_id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("flagged={}", ids));
        }
        parts.join(", ")
    }
}

/// Groups visits into days and prices them for `num_persons` travellers.
/// Visits whose attraction is missing from `catalog` or whose day falls
/// outside `1..=num_days` are left out.
pub fn aggregate(
    visits: &VisitMap,
    catalog: &[Attraction],
    nationality: Nationality,
    num_persons: u32,
    num_days: u32,
) -> ItinerarySnapshot {
    let by_id: HashMap<&AttractionId, &Attraction> =
        catalog.iter().map(|a| (&a.id, a)).collect();
    let mut days: Vec<Vec<ScheduledVisit>> = vec![Vec::new(); num_days as usize];

    for visit in visits.values() {
        let Some(attraction) = by_id.get(&visit.attraction_id) else {
            continue;
        };
        let Some(bucket) = visit
            .day
            .checked_sub(1)
            .and_then(|idx| days.get_mut(idx as usize))
        else {
            continue;
        };
        bucket.push(ScheduledVisit {
            attraction_id: visit.attraction_id.clone(),
            name: attraction.name.clone(),
            day: visit.day,
            start: visit.start,
            end: visit.end,
            fee: attraction.fee_per_person(nationality) * f64::from(num_persons),
            flagged: visit.flagged,
        });
    }

    for day in &mut days {
        day.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.attraction_id.cmp(&b.attraction_id))
        });
    }

    let total_fee = days.iter().flatten().map(|v| v.fee).sum();
    debug!(num_days, %nationality, num_persons, total_fee, "itinerary aggregated");
    ItinerarySnapshot {
        itinerary_by_day: days,
        total_fee,
    }
}

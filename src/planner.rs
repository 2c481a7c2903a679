use crate::allocator::{SlotAllocator, UnplaceableAttraction};
use crate::attraction::{
    Attraction, AttractionFilters, AttractionValidationError, Nationality, validate_catalog,
    validate_custom_attraction,
};
use crate::catalog::{AttractionCatalog, CatalogError, WeatherOracle};
use crate::clock::TimeOfDay;
use crate::config::{ConfigError, PlannerConfig};
use crate::conflict;
use crate::itinerary::{self, ItinerarySnapshot, SavedItinerary};
use crate::overrides::{self, OverrideError};
use crate::persistence::{ItineraryStore, PersistenceResult};
use crate::trip::{RequestedDaysExceedStay, TripWindow};
use crate::visit::{AttractionId, Slot, Visit, VisitMap};
use crate::weather::{self, DayWeather};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("attraction {0} is not in the catalog")]
    UnknownAttraction(AttractionId),
    #[error("invalid attraction: {0}")]
    InvalidAttraction(#[from] AttractionValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything an allocation pass depends on. A pass runs only when this
/// differs from what the current visits were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AllocationInputs {
    selected: Vec<AttractionId>,
    num_days: u32,
    good_days: Vec<bool>,
    catalog_revision: u64,
}

/// The user's choices for one trip, as kept between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerState {
    pub num_days: u32,
    pub num_persons: u32,
    pub nationality: Nationality,
    pub selected_attractions: Vec<AttractionId>,
    #[serde(default)]
    pub filters: AttractionFilters,
    #[serde(default)]
    pub visit_times: VisitMap,
}

/// One planning session over a fixed trip window.
///
/// Every mutation ends in [`TripPlanner::recompute`], which re-runs the slot
/// allocator only when the selection, the day count, the weather or the
/// catalog changed, and always re-prices the itinerary.
#[derive(Debug, Clone)]
pub struct TripPlanner {
    config: PlannerConfig,
    allocator: SlotAllocator,
    city: String,
    trip: TripWindow,
    catalog: Vec<Attraction>,
    catalog_revision: u64,
    weather: Vec<DayWeather>,
    filters: AttractionFilters,
    selected: Vec<AttractionId>,
    num_days: u32,
    nationality: Nationality,
    num_persons: u32,
    visits: VisitMap,
    warnings: Vec<UnplaceableAttraction>,
    snapshot: ItinerarySnapshot,
    last_inputs: Option<AllocationInputs>,
}

impl TripPlanner {
    pub fn new(
        config: PlannerConfig,
        city: impl Into<String>,
        trip: TripWindow,
        catalog: Vec<Attraction>,
        weather: Vec<DayWeather>,
    ) -> Result<Self, PlannerError> {
        config.validate()?;
        validate_catalog(&catalog)?;
        let mut planner = Self {
            allocator: SlotAllocator::new(&config),
            city: city.into(),
            num_days: trip.stay_days(),
            nationality: config.default_nationality,
            num_persons: config.default_num_persons,
            config,
            trip,
            catalog,
            catalog_revision: 0,
            weather,
            filters: AttractionFilters::default(),
            selected: Vec::new(),
            visits: VisitMap::new(),
            warnings: Vec::new(),
            snapshot: ItinerarySnapshot::default(),
            last_inputs: None,
        };
        planner.recompute();
        Ok(planner)
    }

    /// Pulls the attraction list and forecast for `city`. A failed forecast
    /// is logged and treated as all-good weather.
    pub fn load<C, W>(
        catalog: &C,
        oracle: &W,
        city: &str,
        trip: TripWindow,
        config: PlannerConfig,
    ) -> Result<Self, PlannerError>
    where
        C: AttractionCatalog + ?Sized,
        W: WeatherOracle + ?Sized,
    {
        let attractions = catalog.list_attractions(city)?;
        let weather = match oracle.daily_forecast(city, trip.arrival, trip.departure) {
            Ok(weather) => weather,
            Err(err) => {
                warn!(city, error = %err, "weather fetch failed; assuming good weather");
                Vec::new()
            }
        };
        Self::new(config, city, trip, attractions, weather)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn trip(&self) -> &TripWindow {
        &self.trip
    }

    pub fn catalog(&self) -> &[Attraction] {
        &self.catalog
    }

    pub fn attraction(&self, id: &AttractionId) -> Option<&Attraction> {
        self.catalog.iter().find(|a| a.id == *id)
    }

    pub fn weather(&self) -> &[DayWeather] {
        &self.weather
    }

    pub fn good_days(&self) -> Vec<bool> {
        weather::good_days(&self.weather, self.num_days)
    }

    pub fn filters(&self) -> AttractionFilters {
        self.filters
    }

    pub fn selected(&self) -> &[AttractionId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &AttractionId) -> bool {
        self.selected.contains(id)
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }

    pub fn nationality(&self) -> Nationality {
        self.nationality
    }

    pub fn num_persons(&self) -> u32 {
        self.num_persons
    }

    pub fn visits(&self) -> &VisitMap {
        &self.visits
    }

    pub fn itinerary(&self) -> &ItinerarySnapshot {
        &self.snapshot
    }

    /// Attractions that could only be placed by breaking a constraint.
    pub fn warnings(&self) -> &[UnplaceableAttraction] {
        &self.warnings
    }

    pub fn visible_attractions(&self) -> Vec<&Attraction> {
        self.filters.apply(&self.catalog)
    }

    pub fn select(&mut self, id: impl Into<AttractionId>) -> Result<(), PlannerError> {
        let id = id.into();
        if self.attraction(&id).is_none() {
            return Err(PlannerError::UnknownAttraction(id));
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
            self.recompute();
        }
        Ok(())
    }

    /// Returns `false` when the attraction was not selected.
    pub fn deselect(&mut self, id: &AttractionId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|sid| sid != id);
        if self.selected.len() == before {
            return false;
        }
        self.visits.remove(id);
        self.recompute();
        true
    }

    pub fn set_num_days(&mut self, requested: u32) -> Option<RequestedDaysExceedStay> {
        let (num_days, clamp) = self.trip.clamp_days(requested);
        if let Some(clamp) = &clamp {
            warn!(%clamp, "planning days clamped to stay length");
        }
        self.num_days = num_days;
        self.recompute();
        clamp
    }

    pub fn set_nationality(&mut self, nationality: Nationality) {
        self.nationality = nationality;
        self.recompute();
    }

    pub fn set_num_persons(&mut self, num_persons: u32) {
        self.num_persons = num_persons.max(1);
        self.recompute();
    }

    pub fn set_weather(&mut self, weather: Vec<DayWeather>) {
        self.weather = weather;
        self.recompute();
    }

    pub fn set_catalog(&mut self, catalog: Vec<Attraction>) -> Result<(), PlannerError> {
        validate_catalog(&catalog)?;
        self.catalog = catalog;
        self.catalog_revision += 1;
        self.recompute();
        Ok(())
    }

    /// Only affects which attractions are listed.
    pub fn set_filters(&mut self, filters: AttractionFilters) {
        self.filters = filters;
    }

    /// Adds a user-entered place. Existing entries are untouched and the new
    /// one is unselected, so the current allocation stays valid.
    pub fn add_custom_attraction(&mut self, attraction: Attraction) -> Result<(), PlannerError> {
        validate_custom_attraction(&attraction)?;
        if self.attraction(&attraction.id).is_some() {
            return Err(AttractionValidationError::new(format!(
                "attraction id {} already exists",
                attraction.id
            ))
            .into());
        }
        info!(attraction = %attraction.id, "custom place added");
        self.catalog.push(attraction);
        Ok(())
    }

    pub fn manual_override(
        &mut self,
        id: &AttractionId,
        day: u32,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Visit, OverrideError> {
        if day == 0 || day > self.num_days {
            return Err(OverrideError::DayOutOfRange {
                day,
                num_days: self.num_days,
            });
        }
        let visit = overrides::apply_override(
            id,
            Slot::new(day, start, end),
            &mut self.visits,
            &self.catalog,
            self.config.default_opening_hours,
        )?;
        self.warnings.retain(|w| w.attraction_id != *id);
        self.recompute();
        Ok(visit)
    }

    /// Drops any manual edits and schedules the selection again.
    pub fn reallocate(&mut self) {
        self.last_inputs = None;
        self.recompute();
    }

    pub fn recompute(&mut self) {
        let inputs = self.allocation_inputs();
        if self.last_inputs.as_ref() != Some(&inputs) {
            let allocation = self.allocator.allocate(
                &self.selected,
                &self.catalog,
                &self.weather,
                self.num_days,
                &self.visits,
            );
            for id in &allocation.missing {
                warn!(attraction = %id, "selected attraction missing from catalog");
            }
            self.visits = allocation.visits;
            self.warnings = allocation.warnings;
            self.last_inputs = Some(inputs);
        } else {
            debug!("allocation inputs unchanged; re-pricing only");
        }
        self.snapshot = itinerary::aggregate(
            &self.visits,
            &self.catalog,
            self.nationality,
            self.num_persons,
            self.num_days,
        );
    }

    fn allocation_inputs(&self) -> AllocationInputs {
        AllocationInputs {
            selected: self.selected.clone(),
            num_days: self.num_days,
            good_days: self.good_days(),
            catalog_revision: self.catalog_revision,
        }
    }

    pub fn save_itinerary(&self) -> SavedItinerary {
        self.save_itinerary_at(Utc::now())
    }

    pub fn save_itinerary_at(&self, saved_at: DateTime<Utc>) -> SavedItinerary {
        self.snapshot.clone().stamp(saved_at)
    }

    pub fn save_to_store<S>(&self, store: &S, owner: &str) -> PersistenceResult<SavedItinerary>
    where
        S: ItineraryStore + ?Sized,
    {
        let saved = self.save_itinerary();
        store.save_itinerary(owner, &saved)?;
        info!(
            owner,
            visits = saved.itinerary.visit_count(),
            total_fee = saved.itinerary.total_fee,
            "itinerary saved"
        );
        Ok(saved)
    }

    pub fn state(&self) -> PlannerState {
        PlannerState {
            num_days: self.num_days,
            num_persons: self.num_persons,
            nationality: self.nationality,
            selected_attractions: self.selected.clone(),
            filters: self.filters,
            visit_times: self.visits.clone(),
        }
    }

    /// Re-applies a saved session. Saved visit times are kept when they
    /// still cover the whole selection inside the trip and every unflagged
    /// visit is inside opening hours without double booking. Otherwise the
    /// selection is scheduled again.
    pub fn restore_state(&mut self, state: PlannerState) -> Option<RequestedDaysExceedStay> {
        let (num_days, clamp) = self.trip.clamp_days(state.num_days);
        if let Some(clamp) = &clamp {
            warn!(%clamp, "restored planning days clamped to stay length");
        }
        self.num_days = num_days;
        self.num_persons = state.num_persons.max(1);
        self.nationality = state.nationality;
        self.filters = state.filters;

        self.selected.clear();
        for id in state.selected_attractions {
            if self.attraction(&id).is_none() {
                warn!(attraction = %id, "dropping restored selection missing from catalog");
                continue;
            }
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }

        let mut visits = state.visit_times;
        visits.retain(|id, _| self.selected.contains(id));
        let complete = self.selected.iter().all(|id| {
            visits
                .get(id)
                .is_some_and(|v| v.day >= 1 && v.day <= num_days && v.start < v.end)
        });
        let consistent = complete && self.restored_visits_are_consistent(&visits);
        self.visits = visits;
        self.last_inputs = if consistent {
            Some(self.allocation_inputs())
        } else {
            None
        };
        self.warnings = self
            .visits
            .values()
            .filter(|v| v.flagged)
            .map(|v| UnplaceableAttraction {
                attraction_id: v.attraction_id.clone(),
                day: v.day,
            })
            .collect();
        self.recompute();
        clamp
    }

    fn restored_visits_are_consistent(&self, visits: &VisitMap) -> bool {
        let settled: Vec<&Visit> = visits.values().filter(|v| !v.flagged).collect();
        let in_hours = settled.iter().all(|visit| {
            self.attraction(&visit.attraction_id).is_some_and(|attraction| {
                conflict::within_opening_hours(
                    &visit.slot(),
                    attraction.hours(self.config.default_opening_hours),
                )
            })
        });
        if !in_hours {
            warn!("restored visit falls outside opening hours; scheduling again");
            return false;
        }
        let clashes = conflict::double_bookings(settled);
        if let Some((a, b)) = clashes.first() {
            warn!(
                first = %a.attraction_id,
                second = %b.attraction_id,
                day = a.day,
                "restored visits overlap; scheduling again"
            );
            return false;
        }
        true
    }
}

pub mod allocator;
pub mod attraction;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod conflict;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod itinerary;
pub mod overrides;
pub mod persistence;
pub mod planner;
pub mod sample;
pub mod trip;
pub mod visit;
pub mod weather;

pub use allocator::{Allocation, SlotAllocator, UnplaceableAttraction, allocate};
pub use attraction::{Attraction, AttractionFilters, EntryFee, Nationality, Setting};
pub use catalog::{AttractionCatalog, CatalogError, StaticCatalog, StaticForecast, WeatherOracle};
pub use clock::{ClockError, OpeningHours, TimeOfDay};
pub use config::{ConfigError, PlannerConfig};
pub use conflict::{overlaps, within_opening_hours};
pub use itinerary::{ItinerarySnapshot, SavedItinerary, ScheduledVisit, aggregate};
pub use overrides::{OverrideError, apply_override};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteItineraryStore;
pub use persistence::{
    ItineraryStore, JsonDirectoryStore, PersistenceError, load_itinerary_from_csv,
    load_itinerary_from_json, load_planner_state_from_json, save_itinerary_to_csv,
    save_itinerary_to_json, save_planner_state_to_json, validate_itinerary,
};
pub use planner::{PlannerError, PlannerState, TripPlanner};
pub use sample::{SAMPLE_CITY, sample_attractions, sample_catalog};
pub use trip::{RequestedDaysExceedStay, TripWindow};
pub use visit::{AttractionId, Slot, Visit, VisitMap};
pub use weather::{DailyConditions, DayWeather};

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    Attraction, AttractionId, ItineraryStore, ItinerarySnapshot, Nationality, OverrideError,
    PersistenceError, PlannerError, SavedItinerary, TimeOfDay, TripPlanner, Visit,
};

#[derive(Clone)]
pub struct AppState {
    planner: Arc<RwLock<TripPlanner>>,
    store: Option<Arc<dyn ItineraryStore + Send + Sync>>,
}

impl AppState {
    pub fn new(planner: TripPlanner) -> Self {
        Self {
            planner: Arc::new(RwLock::new(planner)),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ItineraryStore + Send + Sync>) -> Self {
        self.store = Some(store);
        self
    }

    fn planner(&self) -> Arc<RwLock<TripPlanner>> {
        self.planner.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<OverrideError> for ApiError {
    fn from(value: OverrideError) -> Self {
        match value {
            OverrideError::UnknownAttraction(_) | OverrideError::NotScheduled(_) => {
                ApiError::NotFound(value.to_string())
            }
            OverrideError::TimeConflict { .. } => ApiError::Conflict(value.to_string()),
            OverrideError::DayOutOfRange { .. }
            | OverrideError::InvalidRange { .. }
            | OverrideError::OutsideOpeningHours { .. } => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::UnknownAttraction(_) => ApiError::NotFound(value.to_string()),
            PlannerError::InvalidAttraction(_) => ApiError::Invalid(value.to_string()),
            PlannerError::Catalog(_) | PlannerError::Config(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::InvalidData(_) => ApiError::Invalid(value.to_string()),
            _ => ApiError::Internal(value.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsPayload {
    num_days: Option<u32>,
    nationality: Option<Nationality>,
    num_persons: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub num_days: u32,
    pub nationality: Nationality,
    pub num_persons: u32,
    /// Present when the requested day count was clamped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub itinerary: ItinerarySnapshot,
}

#[derive(Debug, Deserialize)]
struct OverridePayload {
    day: u32,
    visit_start_time: TimeOfDay,
    visit_end_time: TimeOfDay,
}

#[derive(Debug, Default, Deserialize)]
struct SavePayload {
    #[serde(default)]
    owner: Option<String>,
}

const DEFAULT_OWNER: &str = "default";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/attractions", get(list_attractions).post(add_attraction))
        .route("/itinerary", get(get_itinerary))
        .route("/itinerary/save", post(save_itinerary))
        .route("/itinerary/saved", get(load_default_itinerary))
        .route("/itinerary/saved/:owner", get(load_saved_itinerary))
        .route(
            "/selections/:id",
            post(select_attraction).delete(deselect_attraction),
        )
        .route("/settings", put(update_settings))
        .route("/visits/:id", put(override_visit))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "trip planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_attractions(State(state): State<AppState>) -> Json<Vec<Attraction>> {
    let planner = state.planner();
    let attractions = {
        let guard = planner.read();
        guard.visible_attractions().into_iter().cloned().collect()
    };
    Json(attractions)
}

async fn add_attraction(
    State(state): State<AppState>,
    Json(attraction): Json<Attraction>,
) -> Result<(StatusCode, Json<Attraction>), ApiError> {
    let planner = state.planner();
    {
        let mut guard = planner.write();
        guard.add_custom_attraction(attraction.clone())?;
    }
    Ok((StatusCode::CREATED, Json(attraction)))
}

async fn get_itinerary(State(state): State<AppState>) -> Json<ItinerarySnapshot> {
    let planner = state.planner();
    let snapshot = {
        let guard = planner.read();
        guard.itinerary().clone()
    };
    Json(snapshot)
}

async fn select_attraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItinerarySnapshot>, ApiError> {
    let planner = state.planner();
    let snapshot = {
        let mut guard = planner.write();
        guard.select(id)?;
        guard.itinerary().clone()
    };
    Ok(Json(snapshot))
}

async fn deselect_attraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let id = AttractionId::new(id);
    let removed = {
        let mut guard = planner.write();
        guard.deselect(&id)
    };
    if !removed {
        return Err(ApiError::not_found(format!("attraction {id} is not selected")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<SettingsPayload>,
) -> Result<Json<SettingsResponse>, ApiError> {
    if payload.num_persons == Some(0) {
        return Err(ApiError::invalid("num_persons must be at least 1"));
    }
    let planner = state.planner();
    let mut guard = planner.write();
    let mut warning = None;
    if let Some(num_days) = payload.num_days {
        warning = guard.set_num_days(num_days).map(|clamp| clamp.to_string());
    }
    if let Some(nationality) = payload.nationality {
        guard.set_nationality(nationality);
    }
    if let Some(num_persons) = payload.num_persons {
        guard.set_num_persons(num_persons);
    }
    Ok(Json(SettingsResponse {
        num_days: guard.num_days(),
        nationality: guard.nationality(),
        num_persons: guard.num_persons(),
        warning,
        itinerary: guard.itinerary().clone(),
    }))
}

async fn override_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OverridePayload>,
) -> Result<Json<Visit>, ApiError> {
    let planner = state.planner();
    let id = AttractionId::new(id);
    let visit = {
        let mut guard = planner.write();
        guard.manual_override(
            &id,
            payload.day,
            payload.visit_start_time,
            payload.visit_end_time,
        )?
    };
    Ok(Json(visit))
}

async fn save_itinerary(
    State(state): State<AppState>,
    payload: Option<Json<SavePayload>>,
) -> Result<Json<SavedItinerary>, ApiError> {
    let owner = payload
        .and_then(|Json(p)| p.owner)
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());
    let planner = state.planner();
    let guard = planner.read();
    let saved = match &state.store {
        Some(store) => guard.save_to_store(store.as_ref(), &owner)?,
        None => guard.save_itinerary(),
    };
    Ok(Json(saved))
}

async fn load_default_itinerary(
    State(state): State<AppState>,
) -> Result<Json<SavedItinerary>, ApiError> {
    load_saved_itinerary(State(state), Path(DEFAULT_OWNER.to_string())).await
}

async fn load_saved_itinerary(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<SavedItinerary>, ApiError> {
    let Some(store) = &state.store else {
        return Err(ApiError::not_found("no itinerary store configured"));
    };
    store
        .load_itinerary(&owner)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no saved itinerary for {owner}")))
}

#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::util::ServiceExt;
use trip_planner::{
    Attraction, ItinerarySnapshot, JsonDirectoryStore, PlannerConfig, SAMPLE_CITY,
    SavedItinerary, StaticForecast, TripPlanner, TripWindow, http_api, sample_catalog,
};

fn planner() -> TripPlanner {
    let catalog = sample_catalog().unwrap();
    TripPlanner::load(
        &catalog,
        &StaticForecast::new(),
        SAMPLE_CITY,
        TripWindow::new(
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 5).unwrap(),
        ),
        PlannerConfig::default(),
    )
    .unwrap()
}

fn new_router() -> axum::Router {
    http_api::router(http_api::AppState::new(planner()))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = new_router()
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn selection_lifecycle_via_http_api() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(request("POST", "/selections/amber-fort", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot: ItinerarySnapshot = json_body(response).await;
    assert_eq!(snapshot.visit_count(), 1);
    assert_eq!(snapshot.total_fee, 100.0);

    let response = app
        .clone()
        .oneshot(request("POST", "/selections/atlantis", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: Value = json_body(response).await;
    assert_eq!(error["error"], "not_found");

    let response = app
        .clone()
        .oneshot(request("DELETE", "/selections/amber-fort", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/selections/amber-fort", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("GET", "/itinerary", None))
        .await
        .unwrap();
    let snapshot: ItinerarySnapshot = json_body(response).await;
    assert_eq!(snapshot.visit_count(), 0);
}

#[tokio::test]
async fn settings_clamp_days_and_reprice() {
    let app = new_router();
    app.clone()
        .oneshot(request("POST", "/selections/city-palace", None))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/settings",
            Some(json!({ "num_days": 10, "nationality": "foreigner", "num_persons": 2 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let settings: http_api::SettingsResponse = json_body(response).await;
    assert_eq!(settings.num_days, 2);
    assert!(settings.warning.is_some());
    assert_eq!(settings.itinerary.total_fee, 1400.0);

    let response = app
        .oneshot(request("PUT", "/settings", Some(json!({ "num_persons": 0 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn visit_overrides_map_errors_to_statuses() {
    let app = new_router();
    app.clone()
        .oneshot(request("PUT", "/settings", Some(json!({ "num_days": 1 }))))
        .await
        .unwrap();
    for id in ["amber-fort", "hawa-mahal"] {
        app.clone()
            .oneshot(request("POST", &format!("/selections/{id}"), None))
            .await
            .unwrap();
    }

    let edit = |start: &str, end: &str| {
        Some(json!({ "day": 1, "visit_start_time": start, "visit_end_time": end }))
    };

    let response = app
        .clone()
        .oneshot(request("PUT", "/visits/hawa-mahal", edit("09:00", "10:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(request("PUT", "/visits/hawa-mahal", edit("17:00", "18:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = json_body(response).await;
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("09:00 to 17:00")
    );

    let response = app
        .clone()
        .oneshot(request("PUT", "/visits/albert-hall", edit("10:00", "11:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("PUT", "/visits/hawa-mahal", edit("14:00", "15:00")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let visit: Value = json_body(response).await;
    assert_eq!(visit["visit_start_time"], "14:00");
    assert_eq!(visit["flagged"], false);
}

#[tokio::test]
async fn attractions_listing_and_custom_places() {
    let app = new_router();

    let response = app
        .clone()
        .oneshot(request("GET", "/attractions", None))
        .await
        .unwrap();
    let listed: Vec<Attraction> = json_body(response).await;
    assert_eq!(listed.len(), 6);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/attractions",
            Some(json!({ "id": "chai-stop", "name": "Chai Stop", "indoor_outdoor": "indoor" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/attractions",
            Some(json!({
                "id": "chai-stop",
                "name": "Chai Stop",
                "description": "Tea stall",
                "address": "MI Road",
                "avg_visit_duration": 30,
                "indoor_outdoor": "indoor"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("GET", "/attractions", None))
        .await
        .unwrap();
    let listed: Vec<Attraction> = json_body(response).await;
    assert_eq!(listed.len(), 7);
}

#[tokio::test]
async fn saved_itinerary_is_stored_per_owner() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirectoryStore::new(dir.path()).unwrap();
    let state = http_api::AppState::new(planner()).with_store(Arc::new(store));
    let app = http_api::router(state);

    let response = app
        .clone()
        .oneshot(request("GET", "/itinerary/saved", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.clone()
        .oneshot(request("POST", "/selections/jantar-mantar", None))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(request("POST", "/itinerary/save", Some(json!({ "owner": "asha" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved: SavedItinerary = json_body(response).await;
    assert_eq!(saved.itinerary.visit_count(), 1);

    let response = app
        .clone()
        .oneshot(request("GET", "/itinerary/saved/asha", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let loaded: SavedItinerary = json_body(response).await;
    assert_eq!(loaded, saved);

    let response = app
        .clone()
        .oneshot(request("POST", "/itinerary/save", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .oneshot(request("GET", "/itinerary/saved", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

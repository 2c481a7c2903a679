#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use chrono::{Duration, Local, NaiveDate};
    use tracing_subscriber::EnvFilter;
    use trip_planner::{
        JsonDirectoryStore, PlannerConfig, SAMPLE_CITY, StaticCatalog, StaticForecast,
        TripPlanner, TripWindow, http_api, sample_catalog,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("TRIP_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = PlannerConfig::from_env()?;
    let catalog = match std::env::var_os("TRIP_PLANNER_CATALOG") {
        Some(path) => StaticCatalog::from_json_file(path)?,
        None => sample_catalog()?,
    };
    let city = std::env::var("TRIP_PLANNER_CITY").unwrap_or_else(|_| SAMPLE_CITY.to_string());

    let date_var = |name: &str, fallback: NaiveDate| -> Result<NaiveDate, chrono::ParseError> {
        match std::env::var(name) {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"),
            Err(_) => Ok(fallback),
        }
    };
    let today = Local::now().date_naive();
    let arrival = date_var("TRIP_PLANNER_ARRIVAL", today)?;
    let departure = date_var("TRIP_PLANNER_DEPARTURE", arrival + Duration::days(3))?;

    let planner = TripPlanner::load(
        &catalog,
        &StaticForecast::new(),
        &city,
        TripWindow::new(arrival, departure),
        config,
    )?;

    let store_dir =
        std::env::var("TRIP_PLANNER_STORE_DIR").unwrap_or_else(|_| "saved_itineraries".into());
    let store = JsonDirectoryStore::new(store_dir)?;
    let state = http_api::AppState::new(planner).with_store(Arc::new(store));

    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}

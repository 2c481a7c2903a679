//! A small built-in catalog so the binaries can start without external data.

use crate::attraction::{Attraction, EntryFee, Nationality, Setting};
use crate::catalog::{CatalogError, StaticCatalog};
use crate::clock::OpeningHours;

pub const SAMPLE_CITY: &str = "jaipur";

fn hours(daily: &str) -> OpeningHours {
    OpeningHours::parse_or(Some(daily), OpeningHours::default())
}

fn fee(indian: f64, foreigner: f64) -> EntryFee {
    EntryFee::new([(Nationality::Indian, indian), (Nationality::Foreigner, foreigner)])
}

pub fn sample_attractions() -> Vec<Attraction> {
    vec![
        Attraction::new("amber-fort", "Amber Fort", Setting::Outdoor)
            .with_hours(hours("08:00-17:30"))
            .with_duration(180)
            .with_fee(fee(100.0, 500.0))
            .with_tags(["photography", "crowded"]),
        Attraction::new("city-palace", "City Palace", Setting::Both)
            .with_hours(hours("09:30-17:00"))
            .with_duration(120)
            .with_fee(fee(200.0, 700.0))
            .with_tags(["photography"]),
        Attraction::new("hawa-mahal", "Hawa Mahal", Setting::Outdoor)
            .with_hours(hours("09:00-17:00"))
            .with_duration(60)
            .with_fee(fee(50.0, 200.0))
            .with_tags(["photography", "crowded"]),
        Attraction::new("albert-hall", "Albert Hall Museum", Setting::Indoor)
            .with_hours(hours("09:00-17:00"))
            .with_duration(90)
            .with_fee(fee(40.0, 300.0)),
        Attraction::new("jantar-mantar", "Jantar Mantar", Setting::Outdoor)
            .with_hours(hours("09:00-16:30"))
            .with_duration(60)
            .with_fee(fee(50.0, 200.0)),
        Attraction::new("birla-mandir", "Birla Mandir", Setting::Indoor)
            .with_hours(hours("06:00-12:00"))
            .with_duration(45),
    ]
}

pub fn sample_catalog() -> Result<StaticCatalog, CatalogError> {
    let mut catalog = StaticCatalog::new();
    catalog.insert_city(SAMPLE_CITY, sample_attractions())?;
    Ok(catalog)
}

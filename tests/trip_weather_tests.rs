use chrono::NaiveDate;
use trip_planner::weather::good_days;
use trip_planner::{
    AttractionCatalog, CatalogError, DailyConditions, DayWeather, RequestedDaysExceedStay,
    SAMPLE_CITY, StaticForecast, TripWindow, WeatherOracle, sample_catalog,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn conditions(date: NaiveDate, rain: f64, temp: f64, condition: Option<&str>) -> DailyConditions {
    DailyConditions {
        date,
        rain,
        temp,
        condition: condition.map(str::to_string),
    }
}

#[test]
fn stay_length_is_date_difference_with_a_floor_of_one() {
    assert_eq!(TripWindow::new(d(2025, 3, 1), d(2025, 3, 5)).stay_days(), 4);
    assert_eq!(TripWindow::new(d(2025, 3, 1), d(2025, 3, 1)).stay_days(), 1);
    assert_eq!(TripWindow::new(d(2025, 3, 5), d(2025, 3, 1)).stay_days(), 1);
}

#[test]
fn requested_days_are_clamped_to_the_stay() {
    let trip = TripWindow::new(d(2025, 3, 1), d(2025, 3, 4));
    assert_eq!(trip.clamp_days(2), (2, None));
    assert_eq!(
        trip.clamp_days(7),
        (
            3,
            Some(RequestedDaysExceedStay {
                requested: 7,
                stay_days: 3
            })
        )
    );
    assert_eq!(trip.clamp_days(0), (1, None));
}

#[test]
fn day_numbers_map_to_calendar_dates() {
    let trip = TripWindow::new(d(2025, 12, 30), d(2026, 1, 3));
    assert_eq!(trip.date_of_day(1), d(2025, 12, 30));
    assert_eq!(trip.date_of_day(3), d(2026, 1, 1));
}

#[test]
fn daily_conditions_are_classified() {
    let day = d(2025, 6, 1);
    assert!(!conditions(day, 0.0, 25.0, Some("Sunny")).classify().is_bad);
    assert!(conditions(day, 0.4, 25.0, None).classify().is_bad);
    assert!(conditions(day, 0.0, 5.0, None).classify().is_bad);
    assert!(conditions(day, 0.0, 38.0, None).classify().is_bad);
    assert!(conditions(day, 0.0, 22.0, Some("Thunderstorm")).classify().is_bad);
    assert!(conditions(day, 0.0, 22.0, Some("Light Showers")).classify().is_bad);
}

#[test]
fn good_days_pad_missing_forecast_with_good_weather() {
    let weather = vec![DayWeather::bad(), DayWeather::good()];
    assert_eq!(good_days(&weather, 4), vec![false, true, true, true]);
    assert_eq!(good_days(&weather, 1), vec![false]);
}

#[test]
fn static_forecast_fills_unknown_dates() {
    let mut forecast = StaticForecast::new();
    forecast.insert_conditions("Jaipur", [conditions(d(2025, 7, 2), 12.0, 28.0, Some("Rain"))]);

    let days = forecast
        .daily_forecast("jaipur", d(2025, 7, 1), d(2025, 7, 3))
        .unwrap();
    assert_eq!(days, vec![DayWeather::good(), DayWeather::bad(), DayWeather::good()]);

    let err = forecast
        .daily_forecast("jaipur", d(2025, 7, 3), d(2025, 7, 1))
        .unwrap_err();
    assert!(matches!(err, CatalogError::EmptyRange { .. }));
}

#[test]
fn static_catalog_lookup_is_case_insensitive() {
    let catalog = sample_catalog().unwrap();
    let upper = SAMPLE_CITY.to_uppercase();
    assert!(!catalog.list_attractions(&upper).unwrap().is_empty());
    assert!(matches!(
        catalog.list_attractions("atlantis"),
        Err(CatalogError::UnknownCity(_))
    ));
}

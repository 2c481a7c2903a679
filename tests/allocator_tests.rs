use trip_planner::conflict::double_bookings;
use trip_planner::{
    Attraction, AttractionId, DayWeather, OpeningHours, PlannerConfig, Setting, SlotAllocator,
    TimeOfDay, VisitMap, allocate, sample_attractions,
};

fn t(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::hm(h, m).unwrap()
}

fn hours(open: TimeOfDay, close: TimeOfDay) -> OpeningHours {
    OpeningHours::new(open, close).unwrap()
}

fn ids(raw: &[&str]) -> Vec<AttractionId> {
    raw.iter().map(|s| AttractionId::from(*s)).collect()
}

fn place(id: &str, setting: Setting, open: TimeOfDay, close: TimeOfDay, minutes: u32) -> Attraction {
    Attraction::new(id, id.to_uppercase(), setting)
        .with_hours(hours(open, close))
        .with_duration(minutes)
}

#[test]
fn second_visit_moves_past_first_on_a_single_day() {
    let catalog = vec![
        place("a", Setting::Outdoor, t(9, 0), t(18, 0), 120),
        place("b", Setting::Outdoor, t(10, 0), t(17, 0), 90),
    ];
    let weather = vec![DayWeather::good()];
    let allocation = allocate(&ids(&["a", "b"]), &catalog, &weather, 1, &VisitMap::new());

    let a = &allocation.visits[&AttractionId::from("a")];
    assert_eq!((a.day, a.start, a.end), (1, t(9, 0), t(11, 0)));
    let b = &allocation.visits[&AttractionId::from("b")];
    assert_eq!((b.day, b.start, b.end), (1, t(11, 0), t(12, 30)));
    assert!(allocation.warnings.is_empty());
}

#[test]
fn outdoor_attractions_avoid_bad_weather_days() {
    let catalog = vec![
        place("park", Setting::Outdoor, t(9, 0), t(18, 0), 60),
        place("garden", Setting::Outdoor, t(9, 0), t(18, 0), 60),
    ];
    let weather = vec![DayWeather::bad(), DayWeather::good(), DayWeather::bad()];
    let allocation = allocate(&ids(&["park", "garden"]), &catalog, &weather, 3, &VisitMap::new());

    for visit in allocation.visits.values() {
        assert_eq!(visit.day, 2, "{} should be on the only good day", visit.attraction_id);
    }
    assert_eq!(allocation.visits.len(), 2);
    let garden = &allocation.visits[&AttractionId::from("garden")];
    assert_eq!(garden.start, t(10, 0));
}

#[test]
fn outdoor_falls_back_to_least_loaded_day_when_all_days_are_bad() {
    let catalog = vec![
        place("museum", Setting::Indoor, t(9, 0), t(18, 0), 60),
        place("park", Setting::Outdoor, t(9, 0), t(18, 0), 60),
        place("lake", Setting::Outdoor, t(9, 0), t(18, 0), 60),
    ];
    let weather = vec![DayWeather::bad(), DayWeather::bad()];
    let allocation = allocate(
        &ids(&["museum", "park", "lake"]),
        &catalog,
        &weather,
        2,
        &VisitMap::new(),
    );

    // Outdoor entries go first: park on day 1, lake on day 2, then museum on day 1.
    assert_eq!(allocation.visits[&AttractionId::from("park")].day, 1);
    assert_eq!(allocation.visits[&AttractionId::from("lake")].day, 2);
    assert_eq!(allocation.visits[&AttractionId::from("museum")].day, 1);
}

#[test]
fn indoor_attractions_spread_across_days() {
    let catalog = vec![
        place("one", Setting::Indoor, t(9, 0), t(17, 0), 60),
        place("two", Setting::Both, t(9, 0), t(17, 0), 60),
        place("three", Setting::Indoor, t(9, 0), t(17, 0), 60),
    ];
    let allocation = allocate(&ids(&["one", "two", "three"]), &catalog, &[], 3, &VisitMap::new());

    let days: Vec<u32> = ["one", "two", "three"]
        .iter()
        .map(|id| allocation.visits[&AttractionId::from(*id)].day)
        .collect();
    assert_eq!(days, vec![1, 2, 3]);
    assert!(allocation.visits.values().all(|v| v.start == t(9, 0)));
}

#[test]
fn indoor_fills_days_left_empty_by_outdoor_placements() {
    let catalog = vec![
        place("hall", Setting::Indoor, t(9, 0), t(18, 0), 60),
        place("fort", Setting::Outdoor, t(9, 0), t(18, 0), 60),
    ];
    let allocation = allocate(&ids(&["hall", "fort"]), &catalog, &[], 2, &VisitMap::new());

    assert_eq!(allocation.visits[&AttractionId::from("fort")].day, 1);
    assert_eq!(allocation.visits[&AttractionId::from("hall")].day, 2);
}

#[test]
fn visit_longer_than_opening_window_is_flagged() {
    let catalog = vec![place("tiny", Setting::Indoor, t(9, 0), t(10, 0), 120)];
    let allocation = allocate(&ids(&["tiny"]), &catalog, &[], 1, &VisitMap::new());

    let visit = &allocation.visits[&AttractionId::from("tiny")];
    assert!(visit.flagged);
    assert_eq!((visit.start, visit.end), (t(9, 0), t(10, 0)));
    assert_eq!(allocation.warnings.len(), 1);
    assert_eq!(allocation.warnings[0].attraction_id, AttractionId::from("tiny"));
    assert_eq!(allocation.warnings[0].day, 1);
}

#[test]
fn saturated_day_flags_the_later_attraction() {
    let catalog = vec![
        place("first", Setting::Indoor, t(9, 0), t(11, 0), 120),
        place("second", Setting::Indoor, t(9, 0), t(11, 0), 60),
    ];
    let allocation = allocate(&ids(&["first", "second"]), &catalog, &[], 1, &VisitMap::new());

    let first = &allocation.visits[&AttractionId::from("first")];
    assert!(!first.flagged);
    let second = &allocation.visits[&AttractionId::from("second")];
    assert!(second.flagged);
    assert_eq!((second.start, second.end), (t(9, 0), t(10, 0)));
}

#[test]
fn missing_duplicate_and_removed_ids_are_reported() {
    let catalog = vec![place("kept", Setting::Indoor, t(9, 0), t(18, 0), 60)];
    let mut existing = VisitMap::new();
    let previous = allocate(
        &ids(&["kept"]),
        &[
            catalog[0].clone(),
            place("gone", Setting::Indoor, t(9, 0), t(18, 0), 60),
        ],
        &[],
        1,
        &VisitMap::new(),
    );
    existing.extend(previous.visits);
    existing.insert(
        AttractionId::from("gone"),
        trip_planner::Visit::new(
            AttractionId::from("gone"),
            trip_planner::Slot::new(1, t(12, 0), t(13, 0)),
        ),
    );

    let allocation = allocate(&ids(&["kept", "kept", "ghost"]), &catalog, &[], 1, &existing);

    assert_eq!(allocation.visits.len(), 1);
    assert_eq!(allocation.missing, ids(&["ghost"]));
    assert_eq!(allocation.removed, ids(&["gone"]));
}

#[test]
fn missing_duration_uses_configured_default() {
    let catalog = vec![
        Attraction::new("plain", "Plain", Setting::Indoor).with_hours(hours(t(9, 0), t(18, 0))),
    ];
    let allocation = allocate(&ids(&["plain"]), &catalog, &[], 1, &VisitMap::new());
    let visit = &allocation.visits[&AttractionId::from("plain")];
    assert_eq!((visit.start, visit.end), (t(9, 0), t(10, 0)));
}

#[test]
fn attractions_without_hours_use_the_configured_default() {
    let config = PlannerConfig {
        default_opening_hours: hours(t(10, 0), t(16, 0)),
        ..PlannerConfig::default()
    };
    let allocator = SlotAllocator::new(&config);
    let catalog = vec![
        Attraction::new("bazaar", "Bazaar", Setting::Indoor).with_duration(60),
        place("fort", Setting::Indoor, t(8, 0), t(12, 0), 60),
    ];
    let allocation =
        allocator.allocate(&ids(&["bazaar", "fort"]), &catalog, &[], 1, &VisitMap::new());

    let bazaar = &allocation.visits[&AttractionId::from("bazaar")];
    assert_eq!((bazaar.start, bazaar.end), (t(10, 0), t(11, 0)));
    let fort = &allocation.visits[&AttractionId::from("fort")];
    assert_eq!((fort.start, fort.end), (t(8, 0), t(9, 0)));

    let long = Attraction::new("long", "Long", Setting::Indoor).with_duration(420);
    assert!(allocator.find_slot(&long, 1, &VisitMap::new()).flagged);
}

#[test]
fn missing_weather_counts_as_good() {
    let catalog = vec![place("park", Setting::Outdoor, t(9, 0), t(18, 0), 60)];
    let weather = vec![DayWeather::bad()];
    let allocation = allocate(&ids(&["park"]), &catalog, &weather, 3, &VisitMap::new());
    assert_eq!(allocation.visits[&AttractionId::from("park")].day, 2);
}

#[test]
fn allocation_is_deterministic_and_free_of_double_bookings() {
    let catalog = sample_attractions();
    let selected: Vec<AttractionId> = catalog.iter().map(|a| a.id.clone()).collect();
    let weather = vec![DayWeather::good(), DayWeather::bad()];
    let allocator = SlotAllocator::default();

    let first = allocator.allocate(&selected, &catalog, &weather, 2, &VisitMap::new());
    let second = allocator.allocate(&selected, &catalog, &weather, 2, &VisitMap::new());
    assert_eq!(first, second);
    assert_eq!(first.visits.len(), catalog.len());

    let settled = first.visits.values().filter(|v| !v.flagged);
    assert!(double_bookings(settled).is_empty());
    for visit in first.visits.values() {
        assert!(visit.start < visit.end);
        assert!((1..=2).contains(&visit.day));
    }
}

#[test]
fn find_slot_respects_step_alignment() {
    let allocator = SlotAllocator::default();
    let museum = place("museum", Setting::Indoor, t(9, 0), t(18, 0), 45);
    let other = place("other", Setting::Indoor, t(9, 0), t(18, 0), 45);
    let mut visits = VisitMap::new();
    let first = allocator.find_slot(&museum, 1, &visits);
    visits.insert(museum.id.clone(), first);

    let next = allocator.find_slot(&other, 1, &visits);
    assert_eq!((next.start, next.end), (t(10, 0), t(10, 45)));
    assert!(!next.flagged);
}

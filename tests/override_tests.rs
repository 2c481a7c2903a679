use trip_planner::{
    Attraction, AttractionId, OpeningHours, OverrideError, Setting, Slot, TimeOfDay, Visit,
    VisitMap, apply_override,
};

fn t(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::hm(h, m).unwrap()
}

fn catalog() -> Vec<Attraction> {
    vec![
        Attraction::new("a", "A", Setting::Indoor)
            .with_hours(OpeningHours::new(t(9, 0), t(18, 0)).unwrap()),
        Attraction::new("b", "B", Setting::Indoor)
            .with_hours(OpeningHours::new(t(10, 0), t(17, 0)).unwrap()),
        Attraction::new("c", "C", Setting::Outdoor),
    ]
}

fn apply(id: &AttractionId, slot: Slot, visits: &mut VisitMap) -> Result<Visit, OverrideError> {
    apply_override(id, slot, visits, &catalog(), OpeningHours::default())
}

fn scheduled() -> VisitMap {
    [
        ("a", Slot::new(1, t(9, 0), t(11, 0))),
        ("b", Slot::new(1, t(11, 0), t(12, 30))),
    ]
    .into_iter()
    .map(|(id, slot)| (AttractionId::from(id), Visit::new(AttractionId::from(id), slot)))
    .collect()
}

#[test]
fn valid_override_replaces_the_visit() {
    let mut visits = scheduled();
    let b = AttractionId::from("b");
    let moved = apply(&b, Slot::new(1, t(14, 0), t(15, 30)), &mut visits)
        .unwrap();

    assert_eq!((moved.day, moved.start, moved.end), (1, t(14, 0), t(15, 30)));
    assert!(!moved.flagged);
    assert_eq!(visits[&b], moved);
}

#[test]
fn override_into_own_previous_window_is_not_a_conflict() {
    let mut visits = scheduled();
    let a = AttractionId::from("a");
    let moved = apply(&a, Slot::new(1, t(9, 30), t(11, 0)), &mut visits);
    assert!(moved.is_ok());
}

#[test]
fn overlapping_override_is_rejected_and_state_kept() {
    let mut visits = scheduled();
    let before = visits.clone();
    let b = AttractionId::from("b");
    let err = apply(&b, Slot::new(1, t(10, 0), t(11, 30)), &mut visits)
        .unwrap_err();

    match err {
        OverrideError::TimeConflict { other, day, .. } => {
            assert_eq!(other, AttractionId::from("a"));
            assert_eq!(day, 1);
        }
        other => panic!("expected a time conflict, got {other:?}"),
    }
    assert_eq!(visits, before);
}

#[test]
fn override_outside_opening_hours_is_rejected() {
    let mut visits = scheduled();
    let b = AttractionId::from("b");
    let err = apply(&b, Slot::new(1, t(16, 0), t(17, 30)), &mut visits)
        .unwrap_err();
    assert_eq!(
        err,
        OverrideError::OutsideOpeningHours {
            open: t(10, 0),
            close: t(17, 0)
        }
    );
    assert!(err.to_string().contains("10:00 to 17:00"));
}

#[test]
fn inverted_range_is_reported_before_other_checks() {
    let mut visits = scheduled();
    let b = AttractionId::from("b");
    // Also outside opening hours, but the range check runs first.
    let err = apply(&b, Slot::new(1, t(19, 0), t(8, 0)), &mut visits)
        .unwrap_err();
    assert!(matches!(err, OverrideError::InvalidRange { .. }));

    let empty = apply(&b, Slot::new(1, t(12, 0), t(12, 0)), &mut visits)
        .unwrap_err();
    assert!(matches!(empty, OverrideError::InvalidRange { .. }));
}

#[test]
fn unknown_or_unscheduled_attractions_are_rejected() {
    let mut visits = scheduled();
    let slot = Slot::new(1, t(13, 0), t(14, 0));

    let err = apply(&AttractionId::from("zzz"), slot, &mut visits).unwrap_err();
    assert!(matches!(err, OverrideError::UnknownAttraction(_)));

    let err = apply(&AttractionId::from("c"), slot, &mut visits).unwrap_err();
    assert!(matches!(err, OverrideError::NotScheduled(_)));
}

#[test]
fn moving_to_another_day_ignores_the_old_day() {
    let mut visits = scheduled();
    let b = AttractionId::from("b");
    let moved = apply(&b, Slot::new(2, t(10, 0), t(11, 0)), &mut visits)
        .unwrap();
    assert_eq!(moved.day, 2);
    assert_eq!(visits.len(), 2);
}

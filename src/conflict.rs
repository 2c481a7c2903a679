use crate::clock::OpeningHours;
use crate::visit::{AttractionId, Slot, Visit};

/// Half-open interval intersection on the same day.
pub fn slots_intersect(a: &Slot, b: &Slot) -> bool {
    a.day == b.day && a.start < b.end && b.start < a.end
}

/// First visit that clashes with `candidate`, skipping `exclude`.
pub fn find_conflict<'a, I>(
    candidate: &Slot,
    visits: I,
    exclude: Option<&AttractionId>,
) -> Option<&'a Visit>
where
    I: IntoIterator<Item = &'a Visit>,
{
    visits.into_iter().find(|visit| {
        if exclude.is_some_and(|id| *id == visit.attraction_id) {
            return false;
        }
        slots_intersect(candidate, &visit.slot())
    })
}

pub fn overlaps<'a, I>(candidate: &Slot, visits: I, exclude: Option<&AttractionId>) -> bool
where
    I: IntoIterator<Item = &'a Visit>,
{
    find_conflict(candidate, visits, exclude).is_some()
}

pub fn within_opening_hours(slot: &Slot, hours: OpeningHours) -> bool {
    slot.start < slot.end && hours.open() <= slot.start && slot.end <= hours.close()
}

/// Every pair of visits sharing a day and an overlapping range.
pub fn double_bookings<'a, I>(visits: I) -> Vec<(&'a Visit, &'a Visit)>
where
    I: IntoIterator<Item = &'a Visit>,
{
    let visits: Vec<&Visit> = visits.into_iter().collect();
    let mut clashes = Vec::new();
    for (idx, a) in visits.iter().enumerate() {
        for b in &visits[idx + 1..] {
            if slots_intersect(&a.slot(), &b.slot()) {
                clashes.push((*a, *b));
            }
        }
    }
    clashes
}

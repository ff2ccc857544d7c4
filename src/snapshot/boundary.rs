use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Returns the earliest date on or after `reference` that falls on `boundary`.
///
/// A reference already on the boundary day maps to itself.
pub fn next_boundary(reference: NaiveDate, boundary: Weekday) -> NaiveDate {
    let today = reference.weekday().num_days_from_monday();
    let target = boundary.num_days_from_monday();
    let offset = (target + 7 - today) % 7;
    reference + Days::new(offset as u64)
}

//! The "upcoming entries" window.

use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};
use haiq_ical::{CalendarEntry, display_order};

/// Returns `[from, to]` for a window of `days` starting at midnight of
/// `now`'s local date.
#[must_use]
pub fn window<Z: TimeZone>(
    now: &chrono::DateTime<Z>,
    days: i64,
) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let from = now
        .timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| now.with_timezone(&Utc), |dt| dt.with_timezone(&Utc));
    let to = TimeDelta::try_days(days.max(0))
        .and_then(|span| from.checked_add_signed(span))
        .unwrap_or(from);
    (from, to)
}

/// Entries overlapping `[from, to]`, in display order.
#[must_use]
pub fn upcoming_between(
    entries: &[CalendarEntry],
    from: chrono::DateTime<Utc>,
    to: chrono::DateTime<Utc>,
) -> Vec<CalendarEntry> {
    let mut upcoming: Vec<CalendarEntry> = entries
        .iter()
        .filter(|entry| entry.end.instant() >= from && entry.start.instant() <= to)
        .cloned()
        .collect();
    upcoming.sort_by(display_order);
    upcoming
}

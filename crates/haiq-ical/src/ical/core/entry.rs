//! Expanded calendar entries.

use std::cmp::Ordering;

use chrono::Timelike;

use super::DateTime;

/// One concrete occurrence of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEntry {
    pub summary: String,
    pub start: DateTime,
    pub end: DateTime,
    duration_secs: i64,
    all_day: bool,
    same_day: bool,
}

impl CalendarEntry {
    /// Creates an entry, deriving duration and day classification.
    ///
    /// Both classifications use wall-clock times in each value's own zone.
    #[must_use]
    pub fn new(summary: impl Into<String>, start: DateTime, end: DateTime) -> Self {
        let start_local = start.local();
        let end_local = end.local();

        let at = |t: chrono::NaiveDateTime, h: u32, m: u32| t.hour() == h && t.minute() == m;
        let all_day =
            at(start_local, 0, 0) && (at(end_local, 0, 0) || at(end_local, 23, 59));

        Self {
            summary: summary.into(),
            duration_secs: start.seconds_to(&end),
            all_day,
            same_day: start_local.date() == end_local.date(),
            start,
            end,
        }
    }

    /// `end - start` in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    #[must_use]
    pub fn is_same_day(&self) -> bool {
        self.same_day
    }
}

/// Display ordering: earlier start first, longer entry first on equal starts.
#[must_use]
pub fn display_order(a: &CalendarEntry, b: &CalendarEntry) -> Ordering {
    a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::Zone;
    use chrono::NaiveDate;

    fn floating(d: u32, h: u32, m: u32) -> DateTime {
        DateTime::from_local(
            NaiveDate::from_ymd_opt(2026, 3, d)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            Zone::Floating,
        )
    }

    #[test]
    fn midnight_to_midnight_is_all_day() {
        let entry = CalendarEntry::new("Holiday", floating(2, 0, 0), floating(3, 0, 0));
        assert!(entry.is_all_day());
        assert!(!entry.is_same_day());
        assert_eq!(entry.duration_secs(), 86_400);
    }

    #[test]
    fn midnight_to_2359_is_all_day() {
        let entry = CalendarEntry::new("Holiday", floating(2, 0, 0), floating(2, 23, 59));
        assert!(entry.is_all_day());
        assert!(entry.is_same_day());
    }

    #[test]
    fn meeting_is_not_all_day() {
        let entry = CalendarEntry::new("Standup", floating(2, 9, 0), floating(2, 10, 0));
        assert!(!entry.is_all_day());
        assert!(entry.is_same_day());
        assert_eq!(entry.duration_secs(), 3600);
    }

    #[test]
    fn display_order_prefers_longer_on_tie() {
        let short = CalendarEntry::new("short", floating(2, 9, 0), floating(2, 10, 0));
        let long = CalendarEntry::new("long", floating(2, 9, 0), floating(2, 12, 0));
        let later = CalendarEntry::new("later", floating(2, 11, 0), floating(2, 12, 0));

        let mut entries = vec![later.clone(), short.clone(), long.clone()];
        entries.sort_by(display_order);
        assert_eq!(entries, vec![long, short, later]);
    }
}

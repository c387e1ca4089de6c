//! Occurrence start expansion.
//!
//! Combines an event's own start, its `RDATE`s and the repetitions generated
//! by its `RRULE`, then removes `EXDATE`s.

use crate::ical::core::{DateTime, RecurrenceRule, Step};

/// Upper bound on occurrences per rule, the event's own start included.
pub const MAX_OCCURRENCES: u32 = 200;

/// Expands all occurrence starts of an event.
///
/// Order: `start`, then `rdates` verbatim, then generated repetitions.
/// Any start equal (as an instant) to one of `exdates` is dropped, including
/// `start` itself.
#[must_use]
pub fn expand_starts(
    start: &DateTime,
    rule: Option<&RecurrenceRule>,
    rdates: &[DateTime],
    exdates: &[DateTime],
) -> Vec<DateTime> {
    let mut starts = Vec::with_capacity(1 + rdates.len());
    starts.push(*start);
    starts.extend_from_slice(rdates);
    if let Some(rule) = rule {
        starts.extend(repetitions(start, rule));
    }

    if !exdates.is_empty() {
        let before = starts.len();
        starts.retain(|s| !exdates.contains(s));
        tracing::trace!(excluded = before - starts.len(), "Applied exclusions");
    }
    starts
}

/// Generates the repetitions of `start` following `rule`, `start` excluded.
///
/// A working start is advanced one step at a time, so month-end clamping
/// carries over into later repetitions. Stops after `COUNT` (or
/// [`MAX_OCCURRENCES`]) occurrences in total, at the first working start not
/// strictly before `UNTIL`, or when it leaves the representable range.
#[must_use]
pub fn repetitions(start: &DateTime, rule: &RecurrenceRule) -> Vec<DateTime> {
    let limit = rule
        .count
        .map_or(MAX_OCCURRENCES, |count| count.min(MAX_OCCURRENCES));

    let mut out = Vec::new();
    let mut current = *start;
    for n in 1..limit {
        let Some(next) = rule.advance(&current) else {
            tracing::debug!(%rule, n, "Recurrence left the supported date range");
            break;
        };
        current = next;
        if rule.until.is_some_and(|until| current >= until) {
            break;
        }

        out.push(match rule.frequency.step() {
            Step::Seconds(_) => keep_wall_clock(start, &current),
            Step::Months(_) => current,
        });
    }
    out
}

/// Shifts `candidate` so it keeps the wall-clock time of `base` across DST
/// transitions of `base`'s zone.
///
/// A weekly 09:00 meeting in `Europe/Berlin` stays at 09:00 local time after
/// the switch to summer time instead of moving to 10:00.
#[must_use]
pub fn keep_wall_clock(base: &DateTime, candidate: &DateTime) -> DateTime {
    let now = base
        .zone()
        .daylight_offset_at(candidate.instant().naive_utc());
    let shift = base.daylight_offset() - now;
    if shift == 0 {
        return *candidate;
    }
    candidate.add_seconds(shift).unwrap_or_else(|| {
        tracing::debug!(%candidate, shift, "DST correction left the supported date range");
        *candidate
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::core::{Frequency, Zone};
    use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
    use chrono_tz::Tz;

    const BERLIN: Zone = Zone::Named(Tz::Europe__Berlin);

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn rule(frequency: Frequency) -> RecurrenceRule {
        RecurrenceRule::new(frequency)
    }

    #[test_log::test]
    fn count_includes_first_occurrence() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Floating);
        let mut daily = rule(Frequency::Daily);
        daily.count = Some(5);

        let starts = expand_starts(&start, Some(&daily), &[], &[]);
        assert_eq!(starts.len(), 5);
        assert_eq!(starts[4].local(), local(2026, 1, 9, 9, 0));
    }

    #[test_log::test]
    fn unbounded_rule_is_capped() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Floating);
        let starts = expand_starts(&start, Some(&rule(Frequency::Daily)), &[], &[]);
        assert_eq!(starts.len(), MAX_OCCURRENCES as usize);

        let mut huge = rule(Frequency::Daily);
        huge.count = Some(10_000);
        let starts = expand_starts(&start, Some(&huge), &[], &[]);
        assert_eq!(starts.len(), MAX_OCCURRENCES as usize);
    }

    #[test_log::test]
    fn until_is_exclusive() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Floating);
        let mut daily = rule(Frequency::Daily);
        daily.until = Some(DateTime::from_local(local(2026, 1, 8, 9, 0), Zone::Floating));

        let starts = expand_starts(&start, Some(&daily), &[], &[]);
        let days: Vec<u32> = starts.iter().map(|s| s.local().day()).collect();
        assert_eq!(days, vec![5, 6, 7]);
    }

    #[test_log::test]
    fn interval_skips_periods() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Utc);
        let mut weekly = rule(Frequency::Weekly);
        weekly.interval = 2;
        weekly.count = Some(3);

        let starts = expand_starts(&start, Some(&weekly), &[], &[]);
        assert_eq!(starts[1].local(), local(2026, 1, 19, 9, 0));
        assert_eq!(starts[2].local(), local(2026, 2, 2, 9, 0));
    }

    #[test_log::test]
    fn rdates_follow_start_and_exdates_remove() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Floating);
        let extra = DateTime::from_local(local(2026, 1, 20, 14, 0), Zone::Floating);
        let mut daily = rule(Frequency::Daily);
        daily.count = Some(3);
        let skipped = DateTime::from_local(local(2026, 1, 6, 9, 0), Zone::Floating);

        let starts = expand_starts(&start, Some(&daily), &[extra], &[skipped]);
        let third = DateTime::from_local(local(2026, 1, 7, 9, 0), Zone::Floating);
        assert_eq!(starts, vec![start, extra, third]);
    }

    #[test_log::test]
    fn exdate_can_remove_the_first_occurrence() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), Zone::Floating);
        let starts = expand_starts(&start, None, &[], &[start]);
        assert!(starts.is_empty());
    }

    #[test_log::test]
    fn exdate_matches_by_instant() {
        let start = DateTime::from_local(local(2026, 1, 5, 9, 0), BERLIN);
        let mut daily = rule(Frequency::Daily);
        daily.count = Some(3);
        // 2026-01-06 09:00 Berlin is 08:00 UTC
        let skipped = DateTime::from_local(local(2026, 1, 6, 8, 0), Zone::Utc);

        let starts = expand_starts(&start, Some(&daily), &[], &[skipped]);
        assert_eq!(starts.len(), 2);
        assert!(!starts.contains(&skipped));
    }

    #[test_log::test]
    fn weekly_keeps_local_time_across_spring_forward() {
        // Berlin switches to summer time on 2026-03-29
        let start = DateTime::from_local(local(2026, 3, 16, 9, 0), BERLIN);
        let mut weekly = rule(Frequency::Weekly);
        weekly.count = Some(4);

        let starts = expand_starts(&start, Some(&weekly), &[], &[]);
        let hours: Vec<u32> = starts.iter().map(|s| s.local().hour()).collect();
        assert_eq!(hours, vec![9, 9, 9, 9]);
        assert_eq!(starts[3].instant().hour(), 7);
    }

    #[test_log::test]
    fn daily_keeps_local_time_across_fall_back() {
        // and back to standard time on 2026-10-25
        let start = DateTime::from_local(local(2026, 10, 23, 18, 30), BERLIN);
        let mut daily = rule(Frequency::Daily);
        daily.count = Some(4);

        let starts = expand_starts(&start, Some(&daily), &[], &[]);
        for s in &starts {
            assert_eq!((s.local().hour(), s.local().minute()), (18, 30));
        }
        assert_eq!(starts[3].seconds_to(&starts[0]), -(3 * 86_400 + 3600));
    }

    #[test_log::test]
    fn monthly_clamping_accumulates() {
        let start = DateTime::from_local(local(2026, 1, 31, 10, 0), BERLIN);
        let mut monthly = rule(Frequency::Monthly);
        monthly.count = Some(4);

        let starts = expand_starts(&start, Some(&monthly), &[], &[]);
        let dates: Vec<_> = starts.iter().map(|s| s.local()).collect();
        assert_eq!(
            dates,
            vec![
                local(2026, 1, 31, 10, 0),
                local(2026, 2, 28, 10, 0),
                local(2026, 3, 28, 10, 0),
                local(2026, 4, 28, 10, 0),
            ]
        );
    }

    #[test_log::test]
    fn yearly_from_leap_day_stays_on_the_28th() {
        let start = DateTime::from_local(local(2024, 2, 29, 10, 0), Zone::Utc);
        let mut yearly = rule(Frequency::Yearly);
        yearly.count = Some(5);

        let starts = expand_starts(&start, Some(&yearly), &[], &[]);
        let dates: Vec<_> = starts.iter().map(|s| s.local()).collect();
        assert_eq!(
            dates,
            vec![
                local(2024, 2, 29, 10, 0),
                local(2025, 2, 28, 10, 0),
                local(2026, 2, 28, 10, 0),
                local(2027, 2, 28, 10, 0),
                local(2028, 2, 28, 10, 0),
            ]
        );
    }

    #[test_log::test]
    fn monthly_interval_accumulates_from_the_31st() {
        let start = DateTime::from_local(local(2026, 1, 31, 9, 0), Zone::Floating);
        let mut monthly = rule(Frequency::Monthly);
        monthly.interval = 3;
        monthly.count = Some(4);

        let starts = expand_starts(&start, Some(&monthly), &[], &[]);
        let days: Vec<(u32, u32)> = starts
            .iter()
            .map(|s| (s.local().month(), s.local().day()))
            .collect();
        assert_eq!(days, vec![(1, 31), (4, 30), (7, 30), (10, 30)]);
    }

    #[test_log::test]
    fn floating_times_need_no_correction() {
        let start = DateTime::from_local(local(2026, 3, 28, 2, 30), Zone::Floating);
        let mut hourly = rule(Frequency::Hourly);
        hourly.count = Some(3);

        let starts = expand_starts(&start, Some(&hourly), &[], &[]);
        assert_eq!(starts[2].local(), local(2026, 3, 28, 4, 30));
    }
}

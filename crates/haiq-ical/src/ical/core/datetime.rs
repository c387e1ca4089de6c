//! Zone-aware date-time values (RFC 5545 §3.3.5).
//!
//! A [`DateTime`] is stored as an absolute instant plus the [`Zone`] it was
//! written in. Equality and ordering compare instants only, so an `EXDATE`
//! in UTC matches an occurrence expressed in `Europe/Berlin`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{
    FixedOffset, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta,
    TimeZone, Utc,
};
use chrono_tz::{OffsetComponents, Tz};

/// The zone a date-time value was expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// `Z` suffixed values.
    Utc,
    /// No `Z` and no `TZID`. Treated as wall-clock time without DST.
    Floating,
    /// An IANA zone, either named directly or mapped from a Windows name.
    Named(Tz),
    /// A fixed offset recovered from a Windows display name.
    Fixed(FixedOffset),
}

impl Zone {
    /// Offset from UTC at the given UTC instant.
    #[must_use]
    pub fn offset_at(self, utc: NaiveDateTime) -> FixedOffset {
        match self {
            Self::Utc | Self::Floating => Utc.fix(),
            Self::Fixed(offset) => offset,
            Self::Named(tz) => tz.offset_from_utc_datetime(&utc).fix(),
        }
    }

    /// Daylight-saving part of the offset at the given UTC instant, in seconds.
    ///
    /// Zero for everything except named zones observing DST at that instant.
    #[must_use]
    pub fn daylight_offset_at(self, utc: NaiveDateTime) -> i64 {
        match self {
            Self::Named(tz) => tz.offset_from_utc_datetime(&utc).dst_offset().num_seconds(),
            Self::Utc | Self::Floating | Self::Fixed(_) => 0,
        }
    }

    /// Maps a local wall-clock time onto a UTC instant.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the later, standard
    /// time instant. Non-existent local times (DST spring-forward gap) are
    /// interpreted with the offset in force before the gap.
    #[must_use]
    pub fn to_utc(self, local: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Utc | Self::Floating => local,
            Self::Fixed(offset) => local - TimeDelta::seconds(i64::from(offset.local_minus_utc())),
            Self::Named(tz) => match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => dt.naive_utc(),
                LocalResult::Ambiguous(_, standard) => standard.naive_utc(),
                LocalResult::None => {
                    let before_gap = tz
                        .offset_from_local_datetime(&(local - TimeDelta::days(1)))
                        .earliest()
                        .map_or(0, |offset| offset.fix().local_minus_utc());
                    local - TimeDelta::seconds(i64::from(before_gap))
                }
            },
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => write!(f, "UTC"),
            Self::Floating => write!(f, "floating"),
            Self::Named(tz) => write!(f, "{}", tz.name()),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// An instant together with the zone it is displayed in.
#[derive(Debug, Clone, Copy)]
pub struct DateTime {
    utc: NaiveDateTime,
    zone: Zone,
}

impl DateTime {
    /// Creates a value from a local wall-clock time in `zone`.
    #[must_use]
    pub fn from_local(local: NaiveDateTime, zone: Zone) -> Self {
        Self {
            utc: zone.to_utc(local),
            zone,
        }
    }

    /// Creates a value from a UTC instant, displayed in `zone`.
    #[must_use]
    pub fn from_utc(utc: NaiveDateTime, zone: Zone) -> Self {
        Self { utc, zone }
    }

    /// Midnight of `date` as a floating value, used for `DATE` typed properties.
    #[must_use]
    pub fn floating_midnight(date: NaiveDate) -> Self {
        Self::from_local(date.and_time(NaiveTime::MIN), Zone::Floating)
    }

    #[must_use]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Wall-clock time in the value's own zone.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self.zone {
            Zone::Utc | Zone::Floating => self.utc,
            zone => self.utc + TimeDelta::seconds(i64::from(zone.offset_at(self.utc).local_minus_utc())),
        }
    }

    /// The absolute instant. Floating values are read as UTC.
    #[must_use]
    pub fn instant(&self) -> chrono::DateTime<Utc> {
        Utc.from_utc_datetime(&self.utc)
    }

    /// Seconds from `self` to `other` (negative if `other` is earlier).
    #[must_use]
    pub fn seconds_to(&self, other: &Self) -> i64 {
        (other.utc - self.utc).num_seconds()
    }

    /// Adds an absolute number of seconds, keeping the zone.
    #[must_use]
    pub fn add_seconds(&self, seconds: i64) -> Option<Self> {
        let delta = TimeDelta::try_seconds(seconds)?;
        let utc = self.utc.checked_add_signed(delta)?;
        Some(Self::from_utc(utc, self.zone))
    }

    /// Adds calendar months to the wall-clock time, keeping the time of day.
    ///
    /// Days past the end of the target month clamp to its last day.
    #[must_use]
    pub fn add_months(&self, months: u32) -> Option<Self> {
        let local = self.local().checked_add_months(Months::new(months))?;
        Some(Self::from_local(local, self.zone))
    }

    /// DST component of this value's own zone at `self`, in seconds.
    #[must_use]
    pub fn daylight_offset(&self) -> i64 {
        self.zone.daylight_offset_at(self.utc)
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl Eq for DateTime {}

impl Hash for DateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.utc.hash(state);
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.local().format("%Y-%m-%d %H:%M:%S"), self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn named_zone_round_trips_wall_clock() {
        let dt = DateTime::from_local(local(2026, 1, 15, 10, 0), Zone::Named(Tz::Europe__Berlin));
        assert_eq!(dt.instant().naive_utc(), local(2026, 1, 15, 9, 0));
        assert_eq!(dt.local(), local(2026, 1, 15, 10, 0));
        assert_eq!(dt.daylight_offset(), 0);
    }

    #[test]
    fn summer_time_has_daylight_offset() {
        let dt = DateTime::from_local(local(2026, 7, 15, 10, 0), Zone::Named(Tz::Europe__Berlin));
        assert_eq!(dt.daylight_offset(), 3600);
        assert_eq!(dt.instant().naive_utc(), local(2026, 7, 15, 8, 0));
    }

    #[test]
    fn gap_time_uses_offset_before_gap() {
        // 2026-03-29 02:30 does not exist in Berlin.
        let dt = DateTime::from_local(local(2026, 3, 29, 2, 30), Zone::Named(Tz::Europe__Berlin));
        assert_eq!(dt.instant().naive_utc(), local(2026, 3, 29, 1, 30));
        assert_eq!(dt.local(), local(2026, 3, 29, 3, 30));
    }

    #[test]
    fn ambiguous_time_prefers_standard_time() {
        // 2026-10-25 02:30 happens twice in Berlin.
        let dt = DateTime::from_local(local(2026, 10, 25, 2, 30), Zone::Named(Tz::Europe__Berlin));
        assert_eq!(dt.instant().naive_utc(), local(2026, 10, 25, 1, 30));
        assert_eq!(dt.daylight_offset(), 0);
    }

    #[test]
    fn fixed_offset_zone() {
        let zone = Zone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());
        let dt = DateTime::from_local(local(2026, 5, 1, 12, 0), zone);
        assert_eq!(dt.instant().naive_utc(), local(2026, 5, 1, 10, 0));
        assert_eq!(dt.local(), local(2026, 5, 1, 12, 0));
    }

    #[test]
    fn equality_compares_instants() {
        let utc = DateTime::from_local(local(2026, 1, 15, 9, 0), Zone::Utc);
        let berlin =
            DateTime::from_local(local(2026, 1, 15, 10, 0), Zone::Named(Tz::Europe__Berlin));
        assert_eq!(utc, berlin);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let dt = DateTime::from_local(local(2024, 1, 31, 8, 0), Zone::Floating);
        assert_eq!(dt.add_months(1).unwrap().local(), local(2024, 2, 29, 8, 0));
        assert_eq!(dt.add_months(13).unwrap().local(), local(2025, 2, 28, 8, 0));
    }

    #[test]
    fn add_months_keeps_wall_clock_across_dst() {
        let dt = DateTime::from_local(local(2026, 1, 15, 10, 0), Zone::Named(Tz::Europe__Berlin));
        let july = dt.add_months(6).unwrap();
        assert_eq!(july.local(), local(2026, 7, 15, 10, 0));
    }

    #[test]
    fn add_seconds_is_absolute() {
        let dt = DateTime::from_local(local(2026, 3, 28, 10, 0), Zone::Named(Tz::Europe__Berlin));
        let next = dt.add_seconds(86_400).unwrap();
        assert_eq!(next.local(), local(2026, 3, 29, 11, 0));
        assert_eq!(dt.seconds_to(&next), 86_400);
    }
}

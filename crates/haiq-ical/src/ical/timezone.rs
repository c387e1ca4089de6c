//! TZID resolution for date-time values.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and IANA alias
//! canonicalization. Feeds exported from Outlook/Exchange often carry
//! Windows zone IDs or display names instead of IANA names.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::FixedOffset;
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use regex::Regex;

use crate::ical::core::Zone;

/// Error during timezone resolution.
#[derive(Debug, thiserror::Error)]
pub enum TimezoneError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    Unknown(String),
}

/// Windows display-name labels such as `(UTC+01:00) Amsterdam, Berlin`.
#[expect(clippy::expect_used, reason = "constant pattern")]
static UTC_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((?:UTC|GMT)(?:([+-])(\d{1,2}):?(\d{2}))?\)").expect("Invalid UTC label regex")
});

/// Display names without a usable label, mapped to their standard offset in minutes.
const DISPLAY_NAME_OFFSETS: &[(&str, i32)] = &[
    ("Coordinated Universal Time", 0),
    ("Greenwich Mean Time", 0),
    ("Dublin, Edinburgh, Lisbon, London", 0),
    ("Central European Time", 60),
    ("Central European Standard Time", 60),
    ("Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna", 60),
    ("Belgrade, Bratislava, Budapest, Ljubljana, Prague", 60),
    ("Brussels, Copenhagen, Madrid, Paris", 60),
    ("Sarajevo, Skopje, Warsaw, Zagreb", 60),
    ("Eastern European Time", 120),
    ("Athens, Bucharest", 120),
    ("Helsinki, Kyiv, Riga, Sofia, Tallinn, Vilnius", 120),
    ("Moscow, St. Petersburg", 180),
    ("Chennai, Kolkata, Mumbai, New Delhi", 330),
    ("Beijing, Chongqing, Hong Kong, Urumqi", 480),
    ("Osaka, Sapporo, Tokyo", 540),
    ("Canberra, Melbourne, Sydney", 600),
    ("Atlantic Time (Canada)", -240),
    ("Eastern Time (US & Canada)", -300),
    ("Central Time (US & Canada)", -360),
    ("Mountain Time (US & Canada)", -420),
    ("Pacific Time (US & Canada)", -480),
];

/// Resolver for TZID parameter values.
///
/// Caches every successful resolution, so one instance should live for a
/// whole parse pass.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Zone>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a TZID.
    ///
    /// Tried in order: IANA name (including aliases), Windows zone ID,
    /// `(UTC±HH:MM)` label, Windows display name. The last two yield fixed
    /// offsets without DST.
    ///
    /// ## Errors
    ///
    /// Returns `TimezoneError::Unknown` if no strategy recognizes the TZID.
    pub fn resolve(&mut self, tzid: &str) -> Result<Zone, TimezoneError> {
        if let Some(zone) = self.cache.get(tzid) {
            return Ok(*zone);
        }

        let stripped = strip_vendor_prefix(tzid.trim());
        let zone = iana_zone(stripped)
            .or_else(|| windows_zone(stripped))
            .map(Zone::Named)
            .or_else(|| utc_label_offset(stripped).map(Zone::Fixed))
            .or_else(|| display_name_offset(stripped).map(Zone::Fixed))
            .ok_or_else(|| TimezoneError::Unknown(tzid.to_string()))?;

        tracing::trace!(tzid, %zone, "Resolved timezone");
        self.cache.insert(tzid.to_string(), zone);
        Ok(zone)
    }
}

/// Strips the vendor prefixes some clients put in front of IANA names.
fn strip_vendor_prefix(tzid: &str) -> &str {
    tzid.strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid)
}

/// Parses an IANA name, canonicalizing aliases (e.g. `Europe/Kiev`).
fn iana_zone(name: &str) -> Option<Tz> {
    if let Ok(tz) = Tz::from_str(name) {
        return Some(tz);
    }

    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(name);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        return None;
    }
    Tz::from_str(parsed.canonical).ok()
}

/// Maps a Windows zone ID (e.g. `W. Europe Standard Time`) to its IANA zone.
fn windows_zone(name: &str) -> Option<Tz> {
    let windows_parser = WindowsParser::new();
    let tz = windows_parser.parse(name, None)?;

    let iana_parser = IanaParserExtended::new();
    iana_parser
        .iter()
        .find(|entry| entry.time_zone == tz)
        .and_then(|entry| Tz::from_str(entry.canonical).ok())
}

/// Reads the offset from a `(UTC+01:00)` style label.
fn utc_label_offset(name: &str) -> Option<FixedOffset> {
    let caps = UTC_LABEL.captures(name)?;
    let Some(sign) = caps.get(1) else {
        return FixedOffset::east_opt(0);
    };
    let hours: i32 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: i32 = caps.get(3)?.as_str().parse().ok()?;
    if hours > 14 || minutes >= 60 {
        return None;
    }

    let seconds = hours * 3600 + minutes * 60;
    FixedOffset::east_opt(if sign.as_str() == "-" { -seconds } else { seconds })
}

/// Looks up a Windows display name in the fixed-offset table.
fn display_name_offset(name: &str) -> Option<FixedOffset> {
    DISPLAY_NAME_OFFSETS
        .iter()
        .find(|(display, _)| display.eq_ignore_ascii_case(name))
        .and_then(|(_, minutes)| FixedOffset::east_opt(minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_standard_timezone() {
        let mut resolver = TimeZoneResolver::new();
        let zone = resolver.resolve("America/New_York").expect("should resolve");
        assert_eq!(zone, Zone::Named(Tz::America__New_York));
    }

    #[test]
    fn test_resolve_windows_timezone() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(
            resolver.resolve("W. Europe Standard Time").unwrap(),
            Zone::Named(Tz::Europe__Berlin)
        );
        assert_eq!(
            resolver.resolve("Pacific Standard Time").unwrap(),
            Zone::Named(Tz::America__Los_Angeles)
        );
    }

    #[test]
    fn test_resolve_mozilla_prefix() {
        let mut resolver = TimeZoneResolver::new();
        assert_eq!(
            resolver.resolve("/mozilla.org/Europe/Paris").unwrap(),
            Zone::Named(Tz::Europe__Paris)
        );
    }

    #[test]
    fn test_resolve_utc_label() {
        let mut resolver = TimeZoneResolver::new();
        let zone = resolver
            .resolve("(UTC+05:30) Some Custom Zone")
            .expect("label should resolve");
        assert_eq!(zone, Zone::Fixed(FixedOffset::east_opt(19_800).unwrap()));

        let zone = resolver.resolve("(UTC-03:00) Somewhere").unwrap();
        assert_eq!(zone, Zone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap()));
    }

    #[test]
    fn test_resolve_display_name() {
        let mut resolver = TimeZoneResolver::new();
        let zone = resolver
            .resolve("Amsterdam, Berlin, Bern, Rome, Stockholm, Vienna")
            .unwrap();
        assert_eq!(zone, Zone::Fixed(FixedOffset::east_opt(3600).unwrap()));
    }

    #[test]
    fn test_unknown_timezone() {
        let mut resolver = TimeZoneResolver::new();
        assert!(matches!(
            resolver.resolve("Mars/Olympus_Mons"),
            Err(TimezoneError::Unknown(_))
        ));
    }

    #[test]
    fn test_timezone_caching() {
        let mut resolver = TimeZoneResolver::new();
        resolver.resolve("Europe/Berlin").expect("should resolve");
        assert!(resolver.cache.contains_key("Europe/Berlin"));
        resolver
            .resolve("Europe/Berlin")
            .expect("should resolve from cache");
    }
}

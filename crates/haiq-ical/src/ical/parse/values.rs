//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Error sources are discarded (`map_err_ignore`): the line-level
//! [`ParseError`] carries kind, position and a short context instead.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers report position and kind, not the underlying parse error"
)]

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use url::Url;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::ical::core::{DateTime, Frequency, RecurrenceRule, Value, Zone};
use crate::ical::timezone::TimeZoneResolver;

/// Date prefix that turns a bare `TIME` into a date-time.
const TIME_ANCHOR: &str = "00000101T";

#[expect(clippy::expect_used, reason = "constant pattern")]
static UTC_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])(\d{2})(\d{2})(\d{2})?$").expect("Invalid UTC-OFFSET regex")
});

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn naive_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !all_digits(s) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        s[0..4].parse().ok()?,
        s[4..6].parse().ok()?,
        s[6..8].parse().ok()?,
    )
}

fn naive_datetime(s: &str) -> Option<NaiveDateTime> {
    let (date, time) = s.split_once('T')?;
    if time.len() != 6 || !all_digits(time) {
        return None;
    }
    let time = NaiveTime::from_hms_opt(
        time[0..2].parse().ok()?,
        time[2..4].parse().ok()?,
        time[4..6].parse().ok()?,
    )?;
    Some(naive_date(date)?.and_time(time))
}

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<NaiveDate> {
    naive_date(s).ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidDate, line, col).with_context(s.to_string())
    })
}

/// Parses a comma-separated list of DATE values.
///
/// ## Errors
/// Returns an error if the list is empty or any element is invalid.
pub fn parse_date_list(s: &str, line: usize, col: usize) -> ParseResult<Vec<NaiveDate>> {
    if s.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyList, line, col));
    }
    s.split(',').map(|d| parse_date(d, line, col)).collect()
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Formats:
/// - `YYYYMMDDTHHMMSS` (floating, or local to `tzid`)
/// - `YYYYMMDDTHHMMSSZ` (UTC)
/// - `YYYYMMDD` (midnight, accepted for feeds that omit `VALUE=DATE`)
///
/// ## Errors
/// Returns an error if the TZID is unknown, is combined with `Z`, or the
/// string is not a valid date-time.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let zone = match tzid.filter(|t| !t.is_empty()) {
        Some(tzid) => Some(resolver.resolve(tzid).map_err(|e| {
            ParseError::new(ParseErrorKind::UnknownTimezone, line, col).with_context(e.to_string())
        })?),
        None => None,
    };

    let full = if let Some(stripped) = s.strip_suffix('Z') {
        if zone.is_some() {
            return Err(ParseError::new(ParseErrorKind::UtcWithTzid, line, col));
        }
        naive_datetime(stripped).map(|local| DateTime::from_local(local, Zone::Utc))
    } else {
        naive_datetime(s).map(|local| DateTime::from_local(local, zone.unwrap_or(Zone::Floating)))
    };
    if let Some(dt) = full {
        return Ok(dt);
    }

    let date = naive_date(s).ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, col).with_context(s.to_string())
    })?;
    Ok(DateTime::from_local(
        date.and_time(NaiveTime::MIN),
        zone.unwrap_or(Zone::Floating),
    ))
}

/// Parses a comma-separated list of DATE-TIME values sharing one TZID.
///
/// ## Errors
/// Returns an error if the list is empty or any element is invalid.
pub fn parse_datetime_list(
    s: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
    line: usize,
    col: usize,
) -> ParseResult<Vec<DateTime>> {
    if s.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyList, line, col));
    }

    let mut values = Vec::new();
    for item in s.split(',') {
        values.push(parse_datetime(item, tzid, resolver, line, col)?);
    }
    Ok(values)
}

/// Parses a TIME value or list (RFC 5545 §3.3.12).
///
/// Times are anchored to a fixed date and decoded as date-times, so the
/// result is a [`Value::DateTime`] or, for several times, a
/// [`Value::DateTimeList`].
///
/// ## Errors
/// Returns an error if any element is not a valid `HHMMSS[Z]` time.
pub fn parse_time(
    s: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
    line: usize,
    col: usize,
) -> ParseResult<Value> {
    let mut values = Vec::new();
    for item in s.split(',') {
        let anchored = format!("{TIME_ANCHOR}{item}");
        let value = parse_datetime(&anchored, tzid, resolver, line, col).map_err(|e| {
            match e.kind {
                ParseErrorKind::InvalidDateTime => {
                    ParseError::new(ParseErrorKind::InvalidTime, line, col)
                        .with_context(item.to_string())
                }
                _ => e,
            }
        })?;
        values.push(value);
    }

    match values.len() {
        0 => Err(ParseError::new(ParseErrorKind::EmptyList, line, col)),
        1 => Ok(Value::DateTime(values[0])),
        _ => Ok(Value::DateTimeList(values)),
    }
}

/// Parses a UTC-OFFSET value (RFC 5545 §3.3.14) into seconds.
///
/// Format: `(+|-)HHMM[SS]`. Hours above 12 and a zero offset are rejected.
///
/// ## Errors
/// Returns an error if the value is malformed or out of range.
pub fn parse_utc_offset(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    let err = || ParseError::new(ParseErrorKind::InvalidUtcOffset, line, col);
    let caps = UTC_OFFSET.captures(s).ok_or_else(err)?;

    let field = |i: usize| -> i32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (field(2), field(3), field(4));
    if hours > 12 || minutes >= 60 || seconds >= 60 {
        return Err(err().with_context("offset out of range"));
    }

    let total = hours * 3600 + minutes * 60 + seconds;
    if total == 0 {
        return Err(err().with_context("zero offset"));
    }
    let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
    Ok(if negative { -total } else { total })
}

/// Parses an RRULE value (RFC 5545 §3.3.10).
///
/// Understands `FREQ`, `INTERVAL`, `COUNT` and `UNTIL`; other parts are
/// ignored. `UNTIL` is decoded with the line's TZID.
///
/// ## Errors
/// Returns an error if `FREQ` is missing or unknown, `INTERVAL` or `COUNT`
/// is not a positive integer, `UNTIL` is invalid, or both `COUNT` and
/// `UNTIL` are present.
pub fn parse_rrule(
    s: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
    line: usize,
    col: usize,
) -> ParseResult<RecurrenceRule> {
    let mut frequency = None;
    let mut interval = 1;
    let mut count = None;
    let mut until = None;

    for part in s.split(';') {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };

        match name.to_ascii_uppercase().as_str() {
            "FREQ" => frequency = Frequency::parse(value),
            "INTERVAL" => interval = parse_positive(value, ParseErrorKind::InvalidInterval, line, col)?,
            "COUNT" => count = Some(parse_positive(value, ParseErrorKind::InvalidCount, line, col)?),
            "UNTIL" => {
                let parsed = parse_datetime(value, tzid, resolver, line, col).map_err(|e| {
                    ParseError::new(ParseErrorKind::InvalidUntil, line, col)
                        .with_context(e.kind.to_string())
                })?;
                until = Some(parsed);
            }
            _ => {}
        }
    }

    let frequency = frequency.ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidFrequency, line, col).with_context(s.to_string())
    })?;
    if count.is_some() && until.is_some() {
        return Err(ParseError::new(ParseErrorKind::UntilCountConflict, line, col));
    }

    Ok(RecurrenceRule {
        frequency,
        interval,
        count,
        until,
    })
}

fn parse_positive(value: &str, kind: ParseErrorKind, line: usize, col: usize) -> ParseResult<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ParseError::new(kind, line, col).with_context(value.to_string()))
}

/// Decodes a BINARY value (RFC 5545 §3.3.1).
///
/// ## Errors
/// Returns an error unless the line carried `ENCODING=BASE64` and the value
/// is valid base64.
pub fn parse_binary(s: &str, base64: bool, line: usize, col: usize) -> ParseResult<Vec<u8>> {
    if !base64 {
        return Err(ParseError::new(ParseErrorKind::InvalidBinary, line, col)
            .with_context("binary values require ENCODING=BASE64"));
    }
    STANDARD.decode(s.trim()).map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidBinary, line, col).with_context(e.to_string())
    })
}

/// Interprets a URI value leniently.
///
/// Absolute URLs are taken as-is, absolute paths become `file:` URLs and
/// anything else is retried as `http://` + value.
#[must_use]
pub fn parse_uri(s: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(s) {
        return Some(url);
    }
    if s.starts_with('/')
        && let Ok(url) = Url::from_file_path(s)
    {
        return Some(url);
    }
    Url::parse(&format!("http://{s}")).ok()
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Unknown escape, kept verbatim
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Parses a BOOLEAN value (RFC 5545 §3.3.2).
///
/// ## Errors
/// Returns an error if the string is not "TRUE" or "FALSE".
pub fn parse_boolean(s: &str, line: usize, col: usize) -> ParseResult<bool> {
    match s.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ParseError::new(ParseErrorKind::InvalidBoolean, line, col)),
    }
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.trim()
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, line, col))
}

/// Parses a FLOAT value (RFC 5545 §3.3.7).
///
/// ## Errors
/// Returns an error if the string is not a valid float.
pub fn parse_float(s: &str, line: usize, col: usize) -> ParseResult<f64> {
    s.trim()
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidFloat, line, col))
}

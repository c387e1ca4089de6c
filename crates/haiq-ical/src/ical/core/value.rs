//! Typed property values (RFC 5545 §3.3).

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use url::Url;

use super::{DateTime, RecurrenceRule};

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text, or any value without a known type.
    Text(String),
    Boolean(bool),
    Integer(i32),
    Float(f64),
    /// Base64-decoded `BINARY` content.
    Binary(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTime),
    DateList(Vec<NaiveDate>),
    DateTimeList(Vec<DateTime>),
    /// UTC offset in seconds.
    UtcOffset(i32),
    Uri(Url),
    Recur(RecurrenceRule),
}

impl Value {
    /// Returns the text content for text values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a single date-time.
    ///
    /// `DATE` values become floating midnight; one-element lists are unwrapped.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Date(date) => Some(DateTime::floating_midnight(*date)),
            Self::DateTimeList(list) if list.len() == 1 => list.first().copied(),
            Self::DateList(list) if list.len() == 1 => {
                list.first().map(|d| DateTime::floating_midnight(*d))
            }
            _ => None,
        }
    }

    /// Returns all date-times carried by the value, for `RDATE`/`EXDATE`.
    #[must_use]
    pub fn as_datetime_list(&self) -> Vec<DateTime> {
        match self {
            Self::DateTimeList(list) => list.clone(),
            Self::DateList(list) => list.iter().map(|d| DateTime::floating_midnight(*d)).collect(),
            Self::DateTime(dt) => vec![*dt],
            Self::Date(date) => vec![DateTime::floating_midnight(*date)],
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Recur(rule) => Some(rule),
            _ => None,
        }
    }

    /// Returns the text value if it equals `expected`, ignoring ASCII case.
    #[must_use]
    pub fn is_text(&self, expected: &str) -> bool {
        self.as_text().is_some_and(|s| s.eq_ignore_ascii_case(expected))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateList(dates) => {
                let joined: Vec<String> =
                    dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
                f.write_str(&joined.join(","))
            }
            Self::DateTimeList(list) => {
                let joined: Vec<String> = list.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(","))
            }
            Self::UtcOffset(seconds) => {
                let sign = if *seconds < 0 { '-' } else { '+' };
                let abs = seconds.unsigned_abs();
                write!(f, "{sign}{:02}{:02}", abs / 3600, abs % 3600 / 60)?;
                if abs % 60 != 0 {
                    write!(f, "{:02}", abs % 60)?;
                }
                Ok(())
            }
            Self::Uri(url) => write!(f, "{url}"),
            Self::Recur(rule) => write!(f, "{rule}"),
        }
    }
}

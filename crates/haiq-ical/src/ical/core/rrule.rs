//! Recurrence rule model (RFC 5545 §3.3.10, practical subset).

use std::fmt;

use super::DateTime;

/// Recurrence frequency (`FREQ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// How far one repetition advances the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Absolute seconds.
    Seconds(i64),
    /// Calendar months on the wall clock.
    Months(u32),
}

impl Frequency {
    /// Parses a frequency name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Some(Self::Secondly),
            "MINUTELY" => Some(Self::Minutely),
            "HOURLY" => Some(Self::Hourly),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// The unit advanced by one repetition at interval 1.
    #[must_use]
    pub fn step(self) -> Step {
        match self {
            Self::Secondly => Step::Seconds(1),
            Self::Minutely => Step::Seconds(60),
            Self::Hourly => Step::Seconds(60 * 60),
            Self::Daily => Step::Seconds(60 * 60 * 24),
            Self::Weekly => Step::Seconds(60 * 60 * 24 * 7),
            Self::Monthly => Step::Months(1),
            Self::Yearly => Step::Months(12),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

/// A decoded and validated `RRULE` value.
///
/// `count` and `until` are never both set, and `interval` is at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    /// Total number of occurrences, the first one included.
    pub count: Option<u32>,
    /// Exclusive upper bound for generated starts.
    pub until: Option<DateTime>,
}

impl RecurrenceRule {
    #[must_use]
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
        }
    }

    /// Advances `current` by one step of `interval` periods.
    ///
    /// Month steps clamp to the end of the target month, so repeated
    /// advancing from the 31st settles on shorter month ends.
    /// Returns `None` when the result leaves the representable range.
    #[must_use]
    pub fn advance(&self, current: &DateTime) -> Option<DateTime> {
        let interval = self.interval.max(1);
        match self.frequency.step() {
            Step::Seconds(seconds) => {
                current.add_seconds(seconds.checked_mul(i64::from(interval))?)
            }
            Step::Months(months) => current.add_months(months.checked_mul(interval)?),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency.as_str())?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={until}")?;
        }
        Ok(())
    }
}

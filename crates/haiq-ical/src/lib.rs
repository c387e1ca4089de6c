//! Calendar feed decoding.
//!
//! [`parse_feed`] turns the body of an iCalendar feed into a flat list of
//! [`CalendarEntry`] values, one per occurrence, with recurrences expanded.

use std::io::BufRead;

pub mod error;
pub mod ical;

pub use error::{IcalError, IcalResult};
pub use ical::core::{CalendarEntry, DateTime, Zone, display_order};
pub use ical::expand::MAX_OCCURRENCES;

use ical::expand::materialize;
use ical::parse::ContentParser;

/// Parses an in-memory feed into expanded calendar entries.
///
/// Entries come out in feed order; occurrences of one event follow its
/// expansion order. Use [`display_order`] to sort for presentation.
///
/// ## Errors
///
/// Returns an error on stream-level failures. Malformed lines and events are
/// skipped instead.
#[tracing::instrument(skip(data), fields(len = data.len()))]
pub fn parse_feed(data: &[u8]) -> IcalResult<Vec<CalendarEntry>> {
    parse_feed_reader(data)
}

/// Like [`parse_feed`], reading from any buffered source.
///
/// ## Errors
///
/// Returns an error if reading fails or a line exceeds the length limit.
pub fn parse_feed_reader<R: BufRead>(reader: R) -> IcalResult<Vec<CalendarEntry>> {
    let mut parser = ContentParser::new(reader);
    parser.parse()?;
    let entries = materialize(parser.result());
    tracing::debug!(entries = entries.len(), "Parsed feed");
    Ok(entries)
}

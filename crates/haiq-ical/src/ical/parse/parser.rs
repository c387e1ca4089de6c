//! Content line parser for iCalendar feeds (RFC 5545).
//!
//! Turns a byte stream into typed [`ContentLine`]s. Malformed lines are
//! logged and dropped; only stream-level failures abort the parse.

use std::io::BufRead;

use super::error::{ParseError, ParseResult};
use super::lexer::{LogicalLine, LogicalLines, parse_content_line};
use super::values::{
    parse_binary, parse_boolean, parse_date, parse_date_list, parse_datetime,
    parse_datetime_list, parse_float, parse_integer, parse_rrule, parse_time, parse_uri,
    parse_utc_offset, unescape_text,
};
use crate::error::{IcalError, IcalResult};
use crate::ical::core::{ContentLine, Parameter, Value, find_param};
use crate::ical::timezone::TimeZoneResolver;

/// Value type a content line is decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Binary,
    Boolean,
    Date,
    DateList,
    DateTime,
    DateTimeList,
    Time,
    Float,
    Integer,
    Uri,
    UtcOffset,
    Recur,
    /// Escaped TEXT.
    Text,
    /// Unknown type, kept verbatim.
    Opaque,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "DATE" => Self::Date,
            "DATE-LIST" => Self::DateList,
            "DATE-TIME" => Self::DateTime,
            "DATE-TIME-LIST" => Self::DateTimeList,
            "TIME" => Self::Time,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "URI" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            _ => Self::Opaque,
        }
    }
}

/// Determines the value type from an explicit `VALUE` parameter or the
/// property name.
fn determine_value_type(name: &str, params: &[Parameter]) -> ValueType {
    if let Some(explicit) = find_param(params, "VALUE").and_then(Parameter::value) {
        let value_type = ValueType::from_param(explicit);
        return match (name, value_type) {
            // Date lists may carry several comma-separated values
            ("RDATE" | "EXDATE", ValueType::Date) => ValueType::DateList,
            ("RDATE" | "EXDATE", ValueType::DateTime) => ValueType::DateTimeList,
            _ => value_type,
        };
    }

    match name {
        "DTSTART" | "DTEND" | "DTSTAMP" => ValueType::DateTime,
        "RRULE" => ValueType::Recur,
        "RDATE" | "EXDATE" => ValueType::DateTimeList,
        "SUMMARY" | "DESCRIPTION" | "LOCATION" | "COMMENT" => ValueType::Text,
        _ => ValueType::Opaque,
    }
}

/// Decodes a raw value according to its type.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    base64: bool,
    resolver: &mut TimeZoneResolver,
    line: usize,
    col: usize,
) -> ParseResult<Value> {
    Ok(match value_type {
        ValueType::Binary => Value::Binary(parse_binary(raw, base64, line, col)?),
        ValueType::Boolean => Value::Boolean(parse_boolean(raw, line, col)?),
        ValueType::Date => Value::Date(parse_date(raw, line, col)?),
        ValueType::DateList => Value::DateList(parse_date_list(raw, line, col)?),
        ValueType::DateTime => Value::DateTime(parse_datetime(raw, tzid, resolver, line, col)?),
        ValueType::DateTimeList => {
            Value::DateTimeList(parse_datetime_list(raw, tzid, resolver, line, col)?)
        }
        ValueType::Time => parse_time(raw, tzid, resolver, line, col)?,
        ValueType::Float => Value::Float(parse_float(raw, line, col)?),
        ValueType::Integer => Value::Integer(parse_integer(raw, line, col)?),
        ValueType::Uri => parse_uri(raw).map_or_else(|| Value::Text(raw.to_string()), Value::Uri),
        ValueType::UtcOffset => Value::UtcOffset(parse_utc_offset(raw, line, col)?),
        ValueType::Recur => Value::Recur(parse_rrule(raw, tzid, resolver, line, col)?),
        ValueType::Text => Value::Text(unescape_text(raw)),
        ValueType::Opaque => Value::Text(raw.to_string()),
    })
}

/// Single-pass content line parser.
///
/// ```ignore
/// let mut parser = ContentParser::from_bytes(feed);
/// parser.parse()?;
/// for line in parser.result() { /* ... */ }
/// ```
pub struct ContentParser<R> {
    lines: Option<LogicalLines<R>>,
    resolver: TimeZoneResolver,
    result: Vec<ContentLine>,
    skipped: usize,
}

impl<'a> ContentParser<&'a [u8]> {
    /// Creates a parser over an in-memory feed.
    #[must_use]
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<R: BufRead> ContentParser<R> {
    /// Creates a parser reading from `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            lines: Some(LogicalLines::new(reader)),
            resolver: TimeZoneResolver::new(),
            result: Vec::new(),
            skipped: 0,
        }
    }

    /// Reads and decodes the whole input.
    ///
    /// Lines that fail to decode are logged and skipped. On failure the
    /// result is left empty.
    ///
    /// ## Errors
    ///
    /// Returns an error if reading fails, a physical line exceeds the length
    /// limit, or the parser has already consumed its input.
    #[tracing::instrument(skip(self))]
    pub fn parse(&mut self) -> IcalResult<()> {
        let lines = self.lines.take().ok_or(IcalError::AlreadyParsed)?;

        for logical in lines {
            let logical = match logical {
                Ok(logical) => logical,
                Err(e) => {
                    tracing::warn!(error = %e, "Aborting feed parse");
                    self.result.clear();
                    return Err(e);
                }
            };

            match self.parse_line(&logical) {
                Ok(content_line) => self.result.push(content_line),
                Err(e) => {
                    self.skipped += 1;
                    tracing::debug!(line = e.line, column = e.column, "Ignoring line: {e}");
                }
            }
        }

        tracing::debug!(
            count = self.result.len(),
            skipped = self.skipped,
            "Parsed content lines"
        );
        Ok(())
    }

    fn parse_line(&mut self, logical: &LogicalLine) -> ParseResult<ContentLine> {
        let with_text = |e: ParseError| e.with_text(logical.text.clone());

        let raw = parse_content_line(&logical.text, logical.number).map_err(with_text)?;
        let value_type = determine_value_type(&raw.name, &raw.params);
        let tzid = find_param(&raw.params, "TZID").and_then(Parameter::value);
        let value = parse_value(
            &raw.raw_value,
            value_type,
            tzid,
            raw.base64,
            &mut self.resolver,
            logical.number,
            raw.value_column,
        )
        .map_err(with_text)?;

        Ok(ContentLine {
            name: raw.name,
            params: raw.params,
            value,
        })
    }

    /// Decoded lines in input order.
    #[must_use]
    pub fn result(&self) -> &[ContentLine] {
        &self.result
    }

    /// Number of lines dropped because they failed to decode.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn into_result(self) -> Vec<ContentLine> {
        self.result
    }
}

/// Parses an in-memory feed into content lines.
///
/// ## Errors
///
/// Returns an error on stream-level failures (see [`ContentParser::parse`]).
pub fn parse_content_lines(data: &[u8]) -> IcalResult<Vec<ContentLine>> {
    let mut parser = ContentParser::from_bytes(data);
    parser.parse()?;
    Ok(parser.into_result())
}

//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use std::io::{BufRead, Read};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::error::{IcalError, IcalResult};
use crate::ical::core::Parameter;

/// Longest accepted physical line, in bytes.
pub const MAX_LINE_LENGTH: usize = 65_536;

/// An unfolded logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Number of the physical line it starts on (1-based).
    pub number: usize,
    /// Unfolded text.
    pub text: String,
}

/// Streams logical lines out of a byte source, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. A physical line starting with
/// SP or HTAB continues the previous logical line; the CRLF and the single
/// whitespace character are removed. Empty lines are skipped, and a
/// continuation with nothing to continue is dropped.
pub struct LogicalLines<R> {
    reader: R,
    physical: usize,
    pending: Option<LogicalLineBuf>,
    done: bool,
}

struct LogicalLineBuf {
    number: usize,
    bytes: Vec<u8>,
}

impl LogicalLineBuf {
    fn into_line(self) -> LogicalLine {
        LogicalLine {
            number: self.number,
            text: String::from_utf8_lossy(&self.bytes).into_owned(),
        }
    }
}

impl<R: BufRead> LogicalLines<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            physical: 0,
            pending: None,
            done: false,
        }
    }

    /// Reads one physical line without its line ending. `None` at end of input.
    fn read_physical(&mut self) -> IcalResult<Option<Vec<u8>>> {
        let line = self.physical + 1;
        let mut buf = Vec::new();
        let limit = u64::try_from(MAX_LINE_LENGTH + 1).unwrap_or(u64::MAX);
        let read = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut buf)
            .map_err(|source| IcalError::Read { line, source })?;

        if read == 0 {
            return Ok(None);
        }
        if read > MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
            let excerpt: String = String::from_utf8_lossy(&buf).chars().take(40).collect();
            return Err(IcalError::LineTooLong {
                line,
                length: read,
                excerpt,
            });
        }

        self.physical = line;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

impl<R: BufRead> Iterator for LogicalLines<R> {
    type Item = IcalResult<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let bytes = match self.read_physical() {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    self.done = true;
                    return self
                        .pending
                        .take()
                        .filter(|l| !l.bytes.is_empty())
                        .map(|l| Ok(l.into_line()));
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if let Some((&first, continuation)) = bytes.split_first()
                && (first == b' ' || first == b'\t')
            {
                if let Some(pending) = self.pending.as_mut()
                    && !pending.bytes.is_empty()
                {
                    pending.bytes.extend_from_slice(continuation);
                }
                continue;
            }

            let finished = self.pending.replace(LogicalLineBuf {
                number: self.physical,
                bytes,
            });
            if let Some(finished) = finished
                && !finished.bytes.is_empty()
            {
                return Some(Ok(finished.into_line()));
            }
        }
    }
}

/// A content line split into its grammar parts, value not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance, without `ENCODING`.
    pub params: Vec<Parameter>,
    /// Everything after the first `:` outside a quoted parameter value.
    pub raw_value: String,
    /// Whether `ENCODING=BASE64` was present.
    pub base64: bool,
    /// Column where the value starts (1-based).
    pub value_column: usize,
}

/// Character cursor over one logical line. Columns are 1-based.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn column(&self) -> usize {
        self.pos + 1
    }

    /// Consumes characters while `pred` holds.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-'
}

/// Characters allowed in parameter values (no controls except HTAB).
fn is_safe_char(c: char) -> bool {
    c >= ' ' || c == '\t'
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<RawContentLine> {
    let mut cursor = Cursor::new(line);

    let name = cursor.take_while(is_name_char);
    if name.is_empty() {
        let kind = match cursor.peek() {
            None | Some(':' | ';') => ParseErrorKind::MissingPropertyName,
            Some(_) => ParseErrorKind::InvalidPropertyName,
        };
        return Err(ParseError::new(kind, line_num, cursor.column()));
    }

    let name_end = cursor.pos;
    let mut params = Vec::new();
    let mut base64 = false;
    while cursor.peek() == Some(';') {
        cursor.bump();
        let param = parse_parameter(&mut cursor, line_num)?;

        if param.name == "ENCODING" {
            // Consumed here, never exposed.
            base64 |= param.values.len() == 1
                && param.values[0].eq_ignore_ascii_case("BASE64");
        } else {
            params.push(param);
        }
    }

    match cursor.peek() {
        Some(':') => {
            cursor.bump();
        }
        Some(_) if cursor.pos == name_end => {
            // e.g. "DT START:..."; the name stopped at a foreign character
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                cursor.column(),
            ));
        }
        _ => {
            return Err(ParseError::new(
                ParseErrorKind::MissingColon,
                line_num,
                cursor.column(),
            ));
        }
    }

    Ok(RawContentLine {
        name: name.to_uppercase(),
        params,
        value_column: cursor.column(),
        raw_value: cursor.rest(),
        base64,
    })
}

/// Parses one `NAME=value[,value...]` group; the leading `;` is consumed.
fn parse_parameter(cursor: &mut Cursor, line_num: usize) -> ParseResult<Parameter> {
    let name = cursor.take_while(is_name_char);
    if name.is_empty() {
        return Err(
            ParseError::new(ParseErrorKind::InvalidParameter, line_num, cursor.column())
                .with_context("invalid parameter name"),
        );
    }

    if cursor.peek() != Some('=') {
        return Err(
            ParseError::new(ParseErrorKind::InvalidParameter, line_num, cursor.column())
                .with_context("parameter name doesn't end with '='"),
        );
    }

    let mut values = Vec::new();
    loop {
        cursor.bump(); // '=' or ','
        values.push(parse_param_value(cursor, line_num)?);
        if cursor.peek() != Some(',') {
            break;
        }
    }

    Ok(Parameter::with_values(name.to_uppercase(), values))
}

/// Parses a parameter value (possibly quoted).
fn parse_param_value(cursor: &mut Cursor, line_num: usize) -> ParseResult<String> {
    if cursor.peek() != Some('"') {
        return Ok(cursor.take_while(|c| is_safe_char(c) && !matches!(c, '"' | ',' | ':' | ';')));
    }

    let open = cursor.column();
    cursor.bump();
    let value = cursor.take_while(|c| is_safe_char(c) && c != '"');
    match cursor.bump() {
        Some('"') => Ok(value),
        Some(_) => Err(
            ParseError::new(ParseErrorKind::InvalidParameter, line_num, cursor.column() - 1)
                .with_context("control character in quoted parameter value"),
        ),
        None => Err(ParseError::new(ParseErrorKind::UnclosedQuote, line_num, open)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(input: &str) -> Vec<LogicalLine> {
        LogicalLines::new(input.as_bytes())
            .collect::<IcalResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn unfold_simple() {
        let lines = logical("DESCRIPTION:This is a long description\r\n that continues here\r\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].text,
            "DESCRIPTION:This is a long descriptionthat continues here"
        );
    }

    #[test]
    fn unfold_multiple_with_tab() {
        let lines = logical("DESCRIPTION:First\r\n Second\r\n\tThird\r\nSUMMARY:x\r\n");
        assert_eq!(lines[0].text, "DESCRIPTION:FirstSecondThird");
        assert_eq!(lines[1].text, "SUMMARY:x");
        assert_eq!(lines[1].number, 4);
    }

    #[test]
    fn unfold_bare_lf_and_missing_final_newline() {
        let lines = logical("SUMMARY:First\n Second\nLOCATION:Home");
        assert_eq!(lines[0].text, "SUMMARY:FirstSecond");
        assert_eq!(lines[1].text, "LOCATION:Home");
    }

    #[test]
    fn continuation_without_line_is_dropped() {
        let lines = logical(" orphan\r\n\r\n continued\r\nSUMMARY:ok\r\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "SUMMARY:ok");
    }

    #[test]
    fn line_too_long_is_fatal() {
        let input = format!("SUMMARY:{}\r\n", "x".repeat(MAX_LINE_LENGTH + 10));
        let result: IcalResult<Vec<_>> = LogicalLines::new(input.as_bytes()).collect();
        assert!(matches!(
            result,
            Err(IcalError::LineTooLong { line: 1, .. })
        ));
    }

    #[test]
    fn parse_simple_line() {
        let result = parse_content_line("SUMMARY:Team Meeting", 1).unwrap();
        assert_eq!(result.name, "SUMMARY");
        assert!(result.params.is_empty());
        assert_eq!(result.raw_value, "Team Meeting");
        assert_eq!(result.value_column, 9);
    }

    #[test]
    fn parse_lowercase_name() {
        let result = parse_content_line("dtStart:20260123T120000", 1).unwrap();
        assert_eq!(result.name, "DTSTART");
    }

    #[test]
    fn parse_line_with_params() {
        let line = "DTSTART;TZID=America/New_York:20260123T120000";
        let result = parse_content_line(line, 1).unwrap();
        assert_eq!(result.params.len(), 1);
        assert_eq!(result.params[0].name, "TZID");
        assert_eq!(result.params[0].value(), Some("America/New_York"));
        assert_eq!(result.raw_value, "20260123T120000");
    }

    #[test]
    fn parse_line_with_quoted_param() {
        let line = "ATTENDEE;CN=\"Doe, Jane: the; boss\":mailto:jane@example.com";
        let result = parse_content_line(line, 1).unwrap();
        assert_eq!(result.params[0].value(), Some("Doe, Jane: the; boss"));
        assert_eq!(result.raw_value, "mailto:jane@example.com");
    }

    #[test]
    fn parse_line_with_multiple_param_values() {
        let line = "ATTENDEE;ROLE=REQ-PARTICIPANT,\"OPT-PARTICIPANT\":mailto:test@example.com";
        let result = parse_content_line(line, 1).unwrap();
        assert_eq!(
            result.params[0].values,
            vec!["REQ-PARTICIPANT", "OPT-PARTICIPANT"]
        );
    }

    #[test]
    fn encoding_parameter_is_consumed() {
        let line = "ATTACH;ENCODING=BASE64;VALUE=BINARY:SGVsbG8=";
        let result = parse_content_line(line, 1).unwrap();
        assert!(result.base64);
        assert_eq!(result.params.len(), 1);
        assert_eq!(result.params[0].name, "VALUE");

        let result = parse_content_line("ATTACH;ENCODING=8BIT:abc", 1).unwrap();
        assert!(!result.base64);
        assert!(result.params.is_empty());
    }

    #[test]
    fn parse_line_unclosed_quote() {
        let line = "ATTENDEE;CN=\"Unclosed:mailto:test@example.com";
        let err = parse_content_line(line, 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedQuote);
        assert_eq!(err.column, 13);
    }

    #[test]
    fn parse_line_missing_colon() {
        let err = parse_content_line("INVALID", 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingColon);
        assert_eq!(err.column, 8);
    }

    #[test]
    fn parse_line_without_name() {
        let err = parse_content_line(":value", 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingPropertyName);

        let err = parse_content_line("@X:value", 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPropertyName);
    }

    #[test]
    fn parse_parameter_without_equals() {
        let err = parse_content_line("DTSTART;TZID:20260101T000000", 1).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidParameter);
        assert_eq!(err.column, 13);
    }
}

//! Line-local parse errors.
//!
//! A [`ParseError`] never aborts a feed: the line it belongs to is dropped
//! and parsing resumes with the next logical line.

use std::fmt;

/// Result type for line-level parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while decoding one logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Logical line number (1-based, counts physical lines).
    pub line: usize,
    /// Character position of the parser cursor (1-based).
    pub column: usize,
    /// Additional context.
    pub context: Option<String>,
    /// Raw text of the failing logical line.
    pub text: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
            text: None,
        }
    }

    /// Attaches a context message.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches the raw text of the failing line.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.kind)?;
        if let Some(context) = &self.context {
            write!(f, ": {context}")?;
        }
        if let Some(text) = &self.text {
            let pad = " ".repeat(self.column.saturating_sub(1));
            write!(f, "\n{text}\n{pad}^")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Line does not start with a property name.
    MissingPropertyName,
    /// Property name contains an invalid character.
    InvalidPropertyName,
    /// Malformed parameter.
    InvalidParameter,
    /// Quoted parameter value without closing quote.
    UnclosedQuote,
    /// No `:` separating the value.
    MissingColon,
    /// `BINARY` value without `ENCODING=BASE64`, or bad base64.
    InvalidBinary,
    InvalidBoolean,
    InvalidDate,
    InvalidDateTime,
    InvalidTime,
    InvalidInteger,
    InvalidFloat,
    InvalidUtcOffset,
    /// A list value without elements.
    EmptyList,
    /// TZID that resolves to no known zone.
    UnknownTimezone,
    /// `Z` suffix together with a TZID parameter.
    UtcWithTzid,
    /// Missing or unknown `FREQ`.
    InvalidFrequency,
    /// `INTERVAL` not a positive integer.
    InvalidInterval,
    /// `COUNT` not a positive integer.
    InvalidCount,
    /// `UNTIL` not a valid date-time.
    InvalidUntil,
    /// Both `COUNT` and `UNTIL` in one rule.
    UntilCountConflict,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingPropertyName => "missing property name",
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::UnclosedQuote => "unclosed quoted parameter value",
            Self::MissingColon => "invalid property value",
            Self::InvalidBinary => "invalid binary value",
            Self::InvalidBoolean => "invalid value for boolean type",
            Self::InvalidDate => "invalid date specification",
            Self::InvalidDateTime => "invalid date-time specification",
            Self::InvalidTime => "invalid time specification",
            Self::InvalidInteger => "invalid integer",
            Self::InvalidFloat => "invalid float",
            Self::InvalidUtcOffset => "invalid UTC-OFFSET",
            Self::EmptyList => "empty value list",
            Self::UnknownTimezone => "unknown timezone",
            Self::UtcWithTzid => "cannot have TZID and 'Z' UTC designator at the same time",
            Self::InvalidFrequency => "invalid recurrence frequency",
            Self::InvalidInterval => "invalid recurrence interval",
            Self::InvalidCount => "invalid recurrence count",
            Self::InvalidUntil => "invalid recurrence end",
            Self::UntilCountConflict => "recurrence has both COUNT and UNTIL",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_failing_column() {
        let err = ParseError::new(ParseErrorKind::MissingColon, 3, 8).with_text("DTSTART");
        assert_eq!(
            err.to_string(),
            "line 3, column 8: invalid property value\nDTSTART\n       ^"
        );
    }

    #[test]
    fn display_includes_context() {
        let err = ParseError::new(ParseErrorKind::UnknownTimezone, 1, 9)
            .with_context("Mars/Olympus_Mons");
        assert_eq!(
            err.to_string(),
            "line 1, column 9: unknown timezone: Mars/Olympus_Mons"
        );
    }
}

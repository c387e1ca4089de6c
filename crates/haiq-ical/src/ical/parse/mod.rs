//! iCalendar parsing (RFC 5545).

pub mod error;
pub mod lexer;
pub mod parser;
pub mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::{ContentParser, parse_content_lines};

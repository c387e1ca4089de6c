//! iCalendar (RFC 5545) feed handling.
//!
//! - [`core`]: typed values, content lines and calendar entries
//! - [`parse`]: byte stream to content lines
//! - [`timezone`]: TZID resolution
//! - [`expand`]: `VEVENT` blocks to expanded occurrences

pub mod core;
pub mod expand;
pub mod parse;
pub mod timezone;

//! iCalendar core models.
//!
//! These types describe the practical subset of RFC 5545 used by calendar
//! feeds: typed content lines, zone-aware date-times, recurrence rules and
//! the expanded calendar entries handed to the presentation layer.

mod datetime;
mod entry;
mod parameter;
mod property;
mod rrule;
mod value;

pub use datetime::{DateTime, Zone};
pub use entry::{CalendarEntry, display_order};
pub use parameter::Parameter;
pub(crate) use property::find_param;
pub use property::ContentLine;
pub use rrule::{Frequency, RecurrenceRule, Step};
pub use value::Value;

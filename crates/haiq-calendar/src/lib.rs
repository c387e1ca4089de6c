//! Caller-side model of a calendar feed: settings, ETag bookkeeping,
//! background parsing and the upcoming-entries window.

pub mod error;
pub mod feed;
pub mod settings;
pub mod telemetry;
pub mod upcoming;

pub use error::{FeedError, FeedResult};
pub use feed::{CalendarFeed, FeedResponse, FeedUpdate};
pub use settings::{CalendarSettings, LoggingSettings, Settings, load_config};
pub use upcoming::upcoming_between;

pub use haiq_ical::{CalendarEntry, display_order};

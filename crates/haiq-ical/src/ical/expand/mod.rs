//! Event expansion: turns decoded content lines into calendar entries.

pub mod event;
pub mod recurrence;

pub use event::{EventMaterializer, materialize};
pub use recurrence::{MAX_OCCURRENCES, expand_starts};

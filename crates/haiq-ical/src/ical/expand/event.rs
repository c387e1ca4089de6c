//! `VEVENT` materialization.
//!
//! Walks decoded content lines, collects the properties of each event and
//! emits one [`CalendarEntry`] per expanded occurrence.

use super::recurrence::expand_starts;
use crate::ical::core::{CalendarEntry, ContentLine, DateTime, RecurrenceRule};

/// Properties gathered between `BEGIN:VEVENT` and `END:VEVENT`.
#[derive(Debug, Default)]
struct EventDraft {
    summary: String,
    start: Option<DateTime>,
    end: Option<DateTime>,
    rule: Option<RecurrenceRule>,
    rdates: Vec<DateTime>,
    exdates: Vec<DateTime>,
}

impl EventDraft {
    fn absorb(&mut self, line: &ContentLine) {
        match line.name.as_str() {
            "DTSTART" => self.start = line.value.as_datetime(),
            "DTEND" => self.end = line.value.as_datetime(),
            "SUMMARY" => self.summary = line.value.to_string(),
            "RRULE" => self.rule = line.value.as_recur().cloned(),
            "RDATE" => self.rdates.extend(line.value.as_datetime_list()),
            "EXDATE" => self.exdates.extend(line.value.as_datetime_list()),
            _ => {}
        }
    }
}

#[derive(Debug)]
enum State {
    Outside,
    InEvent(EventDraft),
}

/// Incremental event materializer.
///
/// Lines outside a `VEVENT` are ignored, as is a nested `BEGIN:VEVENT`.
/// Events without a usable `DTSTART` produce nothing.
#[derive(Debug)]
pub struct EventMaterializer {
    state: State,
    entries: Vec<CalendarEntry>,
    events: usize,
    dropped: usize,
}

impl Default for EventMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMaterializer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Outside,
            entries: Vec::new(),
            events: 0,
            dropped: 0,
        }
    }

    /// Feeds the next content line.
    pub fn push(&mut self, line: &ContentLine) {
        let state = std::mem::replace(&mut self.state, State::Outside);
        self.state = match state {
            State::Outside if line.is_marker("BEGIN", "VEVENT") => {
                State::InEvent(EventDraft::default())
            }
            State::Outside => State::Outside,
            State::InEvent(draft) if line.is_marker("END", "VEVENT") => {
                self.close(draft);
                State::Outside
            }
            State::InEvent(mut draft) => {
                draft.absorb(line);
                State::InEvent(draft)
            }
        };
    }

    fn close(&mut self, draft: EventDraft) {
        self.events += 1;
        let Some(start) = draft.start else {
            self.dropped += 1;
            tracing::trace!(summary = %draft.summary, "Dropping event without DTSTART");
            return;
        };

        let duration = draft.end.map_or(0, |end| start.seconds_to(&end));
        let starts = expand_starts(&start, draft.rule.as_ref(), &draft.rdates, &draft.exdates);
        tracing::trace!(
            summary = %draft.summary,
            occurrences = starts.len(),
            "Expanded event"
        );

        self.entries.extend(starts.into_iter().map(|occurrence| {
            let end = occurrence.add_seconds(duration).unwrap_or_else(|| {
                tracing::debug!(%occurrence, duration, "Entry end out of range, using start");
                occurrence
            });
            CalendarEntry::new(draft.summary.clone(), occurrence, end)
        }));
    }

    /// Returns the collected entries. An unterminated trailing event is discarded.
    #[must_use]
    pub fn finish(self) -> Vec<CalendarEntry> {
        if matches!(self.state, State::InEvent(_)) {
            tracing::debug!("Discarding unterminated VEVENT");
        }
        tracing::debug!(
            events = self.events,
            dropped = self.dropped,
            entries = self.entries.len(),
            "Materialized events"
        );
        self.entries
    }
}

/// Materializes all events in `lines`.
#[must_use]
pub fn materialize<'a>(lines: impl IntoIterator<Item = &'a ContentLine>) -> Vec<CalendarEntry> {
    let mut materializer = EventMaterializer::new();
    for line in lines {
        materializer.push(line);
    }
    materializer.finish()
}

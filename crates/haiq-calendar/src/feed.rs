//! Calendar feed state.
//!
//! Tracks the ETag of the last accepted feed body, parses new bodies on a
//! blocking worker and keeps the last good entry list when a parse fails.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::TimeZone;
use haiq_ical::CalendarEntry;
use tokio::sync::Mutex;

use crate::error::{FeedError, FeedResult};
use crate::settings::CalendarSettings;
use crate::upcoming::{upcoming_between, window};

/// Result of fetching the feed, as seen by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResponse {
    /// The server answered `304 Not Modified`.
    NotModified,
    /// A full body with its (possibly absent) ETag.
    Body { bytes: Vec<u8>, etag: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    /// Nothing changed; the current entries stay.
    Unchanged,
    /// The entry list was replaced.
    Replaced { count: usize },
}

#[derive(Debug)]
struct Snapshot {
    entries: Arc<[CalendarEntry]>,
    etag: Option<String>,
}

/// Raises a loading flag for as long as it lives.
///
/// Clears the flag even when the owning future is dropped mid-parse.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One configured calendar feed.
///
/// Readers get cheap immutable snapshots via [`CalendarFeed::entries`];
/// updates are serialized and swap entries and ETag together.
#[derive(Debug)]
pub struct CalendarFeed {
    settings: CalendarSettings,
    snapshot: RwLock<Snapshot>,
    update: Mutex<()>,
    loading: AtomicBool,
}

impl CalendarFeed {
    #[must_use]
    pub fn new(settings: CalendarSettings) -> Self {
        if settings.url().is_none() {
            tracing::info!("No calendar URL configured, calendar disabled");
        }
        Self {
            settings,
            snapshot: RwLock::new(Snapshot {
                entries: Arc::from(Vec::<CalendarEntry>::new()),
                etag: None,
            }),
            update: Mutex::new(()),
            loading: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CalendarSettings {
        &self.settings
    }

    /// Whether no feed URL is configured.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.settings.url().is_none()
    }

    /// Whether a feed body is currently being parsed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// ETag of the last accepted body, for `If-None-Match`.
    #[must_use]
    pub fn etag(&self) -> Option<String> {
        self.read().etag.clone()
    }

    /// Current entries, in feed order.
    #[must_use]
    pub fn entries(&self) -> Arc<[CalendarEntry]> {
        Arc::clone(&self.read().entries)
    }

    /// Entries overlapping the configured window from midnight of `now`'s
    /// date, in display order.
    #[must_use]
    pub fn upcoming<Z: TimeZone>(&self, now: &chrono::DateTime<Z>) -> Vec<CalendarEntry> {
        let (from, to) = window(now, self.settings.upcoming_days);
        upcoming_between(&self.entries(), from, to)
    }

    /// ## Summary
    /// Applies a fetch result.
    ///
    /// A `304` or a body carrying the current ETag leaves everything as is.
    /// Otherwise the body is parsed off the async runtime; on success entries
    /// and ETag are replaced, on failure both are kept.
    ///
    /// ## Errors
    /// Returns an error if the feed is disabled, the body fails to parse, or
    /// the parse worker panics.
    #[tracing::instrument(skip_all)]
    pub async fn apply(&self, response: FeedResponse) -> FeedResult<FeedUpdate> {
        if self.is_disabled() {
            return Err(FeedError::Disabled);
        }

        let (bytes, etag) = match response {
            FeedResponse::NotModified => {
                tracing::debug!("Feed not modified");
                return Ok(FeedUpdate::Unchanged);
            }
            FeedResponse::Body { bytes, etag } => (bytes, etag.filter(|etag| !etag.is_empty())),
        };

        let _guard = self.update.lock().await;
        if etag.is_some() && etag == self.etag() {
            tracing::debug!(etag = ?etag, "Feed body unchanged");
            return Ok(FeedUpdate::Unchanged);
        }

        let parsed = {
            let _loading = LoadingGuard::set(&self.loading);
            tokio::task::spawn_blocking(move || haiq_ical::parse_feed(&bytes)).await
        };

        let entries = match parsed {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Keeping previous calendar entries");
                return Err(e.into());
            }
            Err(e) => {
                tracing::error!(error = %e, "Calendar parse worker failed");
                return Err(e.into());
            }
        };

        let count = entries.len();
        {
            let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
            snapshot.entries = Arc::from(entries);
            snapshot.etag = etag;
        }
        tracing::info!(count, "Calendar entries updated");
        Ok(FeedUpdate::Replaced { count })
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

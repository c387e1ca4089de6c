//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::LoggingSettings;

const FALLBACK_LEVEL: &str = "info";

/// Builds the filter for `level`, falling back to `info` on invalid directives.
#[must_use]
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// ## Summary
/// Installs the global tracing subscriber.
///
/// ## Errors
/// Returns an error if a global subscriber is already set.
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let valid = EnvFilter::try_new(settings.level.as_str()).is_ok();

    tracing_subscriber::registry()
        .with(build_filter(&settings.level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    if !valid {
        tracing::warn!(level = %settings.level, "Invalid log level in config, using {FALLBACK_LEVEL}");
    }
    Ok(())
}

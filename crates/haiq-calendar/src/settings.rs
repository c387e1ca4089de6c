use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Environment variable prefix, e.g. `HAIQ_CALENDAR__URL`.
pub const ENV_PREFIX: &str = "HAIQ";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub calendar: CalendarSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarSettings {
    /// Feed location. Without it the calendar is disabled.
    pub url: Option<String>,
    /// Length of the upcoming-entries window in days.
    pub upcoming_days: i64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            url: None,
            upcoming_days: 60,
        }
    }
}

impl CalendarSettings {
    /// Returns the feed URL, treating an empty one as unset.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads settings from defaults, `HAIQ_*` environment variables and an
    /// optional `haiq.toml`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX), Some("haiq"))
    }

    /// ## Summary
    /// Loads settings from the given environment source and optional file
    /// (name without extension).
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load_from(environment: Environment, file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("calendar.upcoming_days", 60)?
            .set_default("logging.level", "info")?
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            );
        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        Ok(builder.build()?.try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads `.env` (if present) and then the settings.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

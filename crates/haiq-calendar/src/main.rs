use anyhow::Context;
use haiq_calendar::telemetry::init_tracing;
use haiq_calendar::{CalendarFeed, FeedResponse, load_config};

/// Reads an `.ics` file and prints the upcoming entries.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = load_config()?;
    init_tracing(&config.logging)?;

    if let Some(path) = std::env::args().nth(1) {
        config.calendar.url = Some(path);
    }
    tracing::info!(config = ?config, "Configuration loaded");

    let Some(path) = config.calendar.url().map(ToString::to_string) else {
        anyhow::bail!("usage: haiq-calendar <feed.ics> (or set HAIQ_CALENDAR__URL)");
    };
    let path = path.strip_prefix("file://").unwrap_or(&path).to_string();
    let bytes = std::fs::read(&path).with_context(|| format!("cannot read {path}"))?;

    let feed = CalendarFeed::new(config.calendar);
    feed.apply(FeedResponse::Body { bytes, etag: None }).await?;

    for entry in feed.upcoming(&chrono::Local::now()) {
        let when = if entry.is_all_day() {
            entry.start.local().format("%Y-%m-%d").to_string()
        } else {
            entry.start.local().format("%Y-%m-%d %H:%M").to_string()
        };
        println!("{when}  {}", entry.summary);
    }
    Ok(())
}

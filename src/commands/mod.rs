pub mod auth;
pub mod config;
pub mod data;
pub mod events;
pub mod template;
pub mod watch;
pub mod weather;
pub mod week;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use calman_core::engine::{EngineSettings, SyncEngine};
use calman_core::settings::Settings;
use calman_core::store::FileStore;
use calman_core::template::TemplateStore;
use calman_provider_google::GoogleSource;

/// Where persisted settings and templates live.
pub fn state_path() -> Result<PathBuf> {
    let config = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config.join("calman").join("state.json"))
}

pub fn load_settings() -> Result<Settings<FileStore>> {
    let settings = Settings::load(FileStore::new(state_path()?))?;
    Ok(settings)
}

pub fn load_templates() -> Result<TemplateStore<FileStore>> {
    let mut templates = TemplateStore::new(FileStore::new(state_path()?));
    templates.load_templates()?;
    Ok(templates)
}

/// Build an engine wired to Google, carrying the persisted settings.
pub fn build_engine() -> Result<SyncEngine<GoogleSource>> {
    let settings = load_settings()?;
    let engine_settings = EngineSettings {
        phase_names: settings.available_phases().to_vec(),
        rounding_value: settings.rounding_value(),
        round_splits: settings.round_splits(),
    };
    Ok(SyncEngine::new(GoogleSource::new(), engine_settings))
}

/// Silent login; bails with a pointer to `calman auth` when no session
/// can be established.
pub async fn require_login(engine: &mut SyncEngine<GoogleSource>) -> Result<()> {
    if !engine.login().await {
        anyhow::bail!("Not logged in. Run `calman auth` first.");
    }
    Ok(())
}

/// Load the window around `date` or bail with the sync state.
pub async fn require_window(
    engine: &mut SyncEngine<GoogleSource>,
    date: Option<DateTime<Utc>>,
) -> Result<()> {
    if !engine.load_events(date).await {
        anyhow::bail!("Could not load events (provider unreachable or session expired).");
    }
    Ok(())
}

/// Parse "YYYY-MM-DD" (midnight UTC) or "YYYY-MM-DDTHH:MM[:SS]".
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    anyhow::bail!(
        "Invalid date/time '{}'. Use \"YYYY-MM-DD\" or \"YYYY-MM-DDTHH:MM\".",
        input
    )
}

/// Parse durations like "30m", "1h", "2h30m", "1d".
pub fn parse_duration(input: &str) -> Result<Duration> {
    let mut total = Duration::zero();
    let mut number = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else {
            let value: i64 = number
                .parse()
                .with_context(|| format!("Invalid duration '{}'", input))?;
            number.clear();
            total += match c {
                'd' => Duration::days(value),
                'h' => Duration::hours(value),
                'm' => Duration::minutes(value),
                _ => anyhow::bail!("Invalid duration unit '{}' in '{}'", c, input),
            };
        }
    }
    if !number.is_empty() {
        anyhow::bail!("Duration '{}' is missing a unit (d, h or m)", input);
    }
    if total <= Duration::zero() {
        anyhow::bail!("Duration must be positive");
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_forms() {
        assert_eq!(
            parse_datetime("2025-03-20").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_datetime("2025-03-20T15:30").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 20, 15, 30, 0).unwrap()
        );
        assert!(parse_datetime("20.03.2025").is_err());
    }

    #[test]
    fn test_parse_duration_forms() {
        assert_eq!(parse_duration("30m").unwrap(), Duration::minutes(30));
        assert_eq!(
            parse_duration("2h30m").unwrap(),
            Duration::minutes(150)
        );
        assert_eq!(parse_duration("1d").unwrap(), Duration::days(1));
        assert!(parse_duration("90").is_err());
        assert!(parse_duration("2x").is_err());
    }
}

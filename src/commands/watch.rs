use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use tracing::debug;

use calman_core::engine::SYNC_POLL_INTERVAL;

use crate::commands::{build_engine, parse_datetime, require_login};
use crate::render::render_week;

/// Render the week and refetch it on the poll interval until
/// interrupted. Each cycle waits for the previous refresh to finish
/// before arming the next one.
pub async fn run(date: Option<String>) -> Result<()> {
    let date = match date {
        Some(s) => Some(parse_datetime(&s)?),
        None => None,
    };

    let mut engine = build_engine()?;
    require_login(&mut engine).await?;

    if let Some(date) = date {
        // Point the view at the requested week before sync turns on.
        if !engine.load_events(Some(date)).await {
            anyhow::bail!("Could not load events.");
        }
    }
    engine.set_sync_on(true).await;
    if !engine.events_loaded() {
        anyhow::bail!("Could not load events (provider unreachable or session expired).");
    }

    println!(
        "Watching (refreshing every {}s, Ctrl-C to stop)\n",
        SYNC_POLL_INTERVAL.as_secs()
    );
    draw(&engine);

    loop {
        tokio::time::sleep(SYNC_POLL_INTERVAL).await;
        let refreshed = engine.poll_tick().await;
        debug!(refreshed, "poll tick");
        if refreshed {
            draw(&engine);
        }
    }
}

fn draw(engine: &calman_core::engine::SyncEngine<calman_provider_google::GoogleSource>) {
    let stamp = Utc::now().format("%H:%M:%S").to_string();
    println!("{}", format!("— refreshed {}", stamp).dimmed());
    println!("{}", render_week(engine.events(), engine.date_in_view(), false));
}

use anyhow::Result;
use chrono::Utc;

use crate::commands::{build_engine, parse_datetime, require_login};
use crate::render::render_week;
use crate::utils::tui::create_spinner;

pub async fn run(date: Option<String>, show_backgrounds: bool) -> Result<()> {
    let date = match date {
        Some(s) => parse_datetime(&s)?,
        None => Utc::now(),
    };

    let mut engine = build_engine()?;
    require_login(&mut engine).await?;

    let spinner = create_spinner("Fetching events...");
    let loaded = engine.load_events(Some(date)).await;
    spinner.finish_and_clear();
    if !loaded {
        anyhow::bail!("Could not load events (provider unreachable or session expired).");
    }

    println!("{}", render_week(engine.events(), date, show_backgrounds));
    Ok(())
}

use anyhow::Result;
use chrono::Duration;

use calman_core::event::{EventDraft, EventRecord};

use crate::commands::{
    build_engine, load_templates, parse_datetime, parse_duration, require_login, require_window,
};
use crate::render::{resolve_id, short_id};
use crate::utils::tui::create_spinner;

#[allow(clippy::too_many_arguments)]
pub async fn add(
    title: String,
    start: String,
    end: Option<String>,
    duration: Option<String>,
    description: Option<String>,
    color: Option<i64>,
    all_day: bool,
    template: Option<usize>,
) -> Result<()> {
    let start = parse_datetime(&start)?;

    let (draft, all_day) = if let Some(index) = template {
        let templates = load_templates()?;
        let template = templates
            .templates()
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("No template at index {}", index))?;

        // The chosen slot sets the start; the template supplies the
        // rest, including its duration.
        let draft = EventDraft {
            title: template.title.clone(),
            start,
            end: start + Duration::minutes(template.duration_minutes()),
            color_id: template.color_id,
            description: template.description.clone(),
        };
        (draft, template.all_day)
    } else {
        let end = if let Some(end) = end {
            parse_datetime(&end)?
        } else if let Some(duration) = duration {
            start + parse_duration(&duration)?
        } else if all_day {
            start + Duration::days(1)
        } else {
            start + Duration::hours(1)
        };

        let draft = EventDraft {
            title,
            start,
            end,
            color_id: color.unwrap_or(-1),
            description: description.unwrap_or_default(),
        };
        (draft, all_day)
    };

    draft.validate()?;

    let mut engine = build_engine()?;
    require_login(&mut engine).await?;
    require_window(&mut engine, Some(start)).await?;

    let spinner = create_spinner(format!("Creating \"{}\"...", draft.title));
    let created = engine.add_event(&draft, all_day).await;
    spinner.finish_and_clear();
    if !created {
        anyhow::bail!("Event was not created.");
    }

    let id = engine
        .events()
        .last()
        .and_then(|e| e.id.as_deref())
        .map(short_id)
        .unwrap_or_default();
    println!("Created {} ({})", draft.title, id);
    Ok(())
}

pub async fn edit(
    event_id: String,
    title: Option<String>,
    start: Option<String>,
    end: Option<String>,
    description: Option<String>,
    color: Option<i64>,
) -> Result<()> {
    let mut engine = build_engine()?;
    require_login(&mut engine).await?;
    require_window(&mut engine, None).await?;

    let (full_id, current) = find_event(engine.events(), &event_id)?;
    let all_day = current.all_day;

    let draft = EventDraft {
        title: title.unwrap_or_else(|| current.title.clone()),
        start: match start {
            Some(s) => parse_datetime(&s)?,
            None => current.start.as_datetime(),
        },
        end: match end {
            Some(s) => parse_datetime(&s)?,
            None => current.end.as_datetime(),
        },
        color_id: color.unwrap_or(current.color_id),
        description: description.unwrap_or_else(|| current.description.clone()),
    };
    draft.validate()?;

    let spinner = create_spinner(format!("Updating \"{}\"...", draft.title));
    let updated = engine.edit_event(&draft, &full_id, all_day).await;
    spinner.finish_and_clear();
    if !updated {
        anyhow::bail!("Event was not updated.");
    }

    println!("Updated {}", draft.title);
    Ok(())
}

pub async fn delete(event_id: String) -> Result<()> {
    let mut engine = build_engine()?;
    require_login(&mut engine).await?;
    require_window(&mut engine, None).await?;

    let (full_id, current) = find_event(engine.events(), &event_id)?;
    let title = current.title.clone();

    let spinner = create_spinner(format!("Deleting \"{}\"...", title));
    let deleted = engine.remove_event(&full_id).await;
    spinner.finish_and_clear();
    if !deleted {
        anyhow::bail!("Event was not deleted.");
    }

    println!("Deleted {}", title);
    Ok(())
}

pub async fn split(event_id: String, percent: f64) -> Result<()> {
    let mut engine = build_engine()?;
    require_login(&mut engine).await?;
    require_window(&mut engine, None).await?;

    let (full_id, current) = find_event(engine.events(), &event_id)?;
    if current.all_day {
        anyhow::bail!("All-day events cannot be split.");
    }

    let draft = EventDraft {
        title: current.title.clone(),
        start: current.start.as_datetime(),
        end: current.end.as_datetime(),
        color_id: current.color_id,
        description: current.description.clone(),
    };
    let title = draft.title.clone();

    let spinner = create_spinner(format!("Splitting \"{}\" at {}%...", title, percent));
    let done = engine.split_event(&draft, &full_id, false, percent).await;
    spinner.finish_and_clear();
    if !done {
        anyhow::bail!("Event was not split.");
    }

    println!("Split {} at {}%", title, percent);
    Ok(())
}

/// Find an event by (possibly shortened) id in the loaded window.
fn find_event<'a>(events: &'a [EventRecord], needle: &str) -> Result<(String, &'a EventRecord)> {
    let full_id = resolve_id(events, needle).ok_or_else(|| {
        anyhow::anyhow!(
            "No event with id '{}' in the current week. Run `calman week` to list ids.",
            needle
        )
    })?;
    let event = events
        .iter()
        .find(|e| e.id.as_deref() == Some(full_id))
        .ok_or_else(|| anyhow::anyhow!("Event '{}' disappeared from the window", full_id))?;
    Ok((full_id.to_string(), event))
}

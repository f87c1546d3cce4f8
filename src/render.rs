//! Terminal rendering for the week view.

use calman_core::event::{DisplayMode, EventRecord, EventTime};
use calman_core::weather::OVERLAY_COLOR_PROP;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use owo_colors::OwoColorize;

/// Render the Monday-Sunday week around `date`, one section per day.
///
/// Background (phase) events and the weather overlay are hidden unless
/// `show_backgrounds` is set; tasks always show.
pub fn render_week(events: &[EventRecord], date: DateTime<Utc>, show_backgrounds: bool) -> String {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    let monday = date.date_naive() - Duration::days(days_from_monday);

    let mut lines = Vec::new();
    for offset in 0..7 {
        let day = monday + Duration::days(offset);
        lines.push(render_day_header(day));

        let mut day_events: Vec<&EventRecord> = events
            .iter()
            .filter(|e| falls_on(e, day))
            .filter(|e| show_backgrounds || e.display != DisplayMode::Background)
            .collect();
        day_events.sort_by_key(|e| e.start.as_datetime());

        if day_events.is_empty() {
            lines.push(format!("   {}", "no events".dimmed()));
        }
        for event in day_events {
            lines.push(format!("   {}", render_event(event)));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn render_day_header(day: NaiveDate) -> String {
    format!("{}", day.format("%A %Y-%m-%d").to_string().bold())
}

fn falls_on(event: &EventRecord, day: NaiveDate) -> bool {
    match (&event.start, &event.end) {
        (EventTime::Date(start), EventTime::Date(end)) => {
            // All-day ranges are end-exclusive, but a zero-length range
            // (tasks) still covers its own day.
            day >= *start && (day < *end || start == end)
        }
        _ => {
            let start = event.start.as_datetime();
            let end = event.end.as_datetime();
            day >= start.date_naive() && day <= end.date_naive()
        }
    }
}

fn render_event(event: &EventRecord) -> String {
    let id = event
        .id
        .as_deref()
        .map(short_id)
        .unwrap_or_else(|| "-".to_string());
    let time = render_time(event);
    let title = if event.is_task() {
        format!("☐ {}", event.title).blue().to_string()
    } else if event.display == DisplayMode::Background {
        if event.extended_props.contains_key(OVERLAY_COLOR_PROP) {
            event.title.cyan().to_string()
        } else {
            event.title.dimmed().to_string()
        }
    } else {
        event.title.clone()
    };

    format!("{} {} {}", id.dimmed(), time, title)
}

fn render_time(event: &EventRecord) -> String {
    if event.all_day {
        return "all-day    ".to_string();
    }
    let start = event.start.as_datetime();
    let end = event.end.as_datetime();
    format!(
        "{:02}:{:02}-{:02}:{:02}",
        start.hour(),
        start.minute(),
        end.hour(),
        end.minute()
    )
}

/// First 8 characters of a provider id, enough to address events from
/// the CLI without pasting the whole id.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Resolve a possibly-shortened id back to a full event id.
pub fn resolve_id<'a>(events: &'a [EventRecord], needle: &str) -> Option<&'a str> {
    let mut matched: Option<&str> = None;
    for event in events {
        if let Some(id) = event.id.as_deref() {
            if id == needle {
                return Some(id);
            }
            if id.starts_with(needle) {
                if matched.is_some() {
                    // Ambiguous prefix.
                    return None;
                }
                matched = Some(id);
            }
        }
    }
    matched
}

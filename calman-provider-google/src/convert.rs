//! Converters between the Google wire shapes and `EventRecord`.
//!
//! All defaulting for inconsistent provider data happens here, at the
//! boundary: missing titles become a placeholder, missing timed fields
//! fall back to the all-day date fields, unparseable colors become the
//! default color id.

use std::collections::BTreeMap;

use calman_core::classify::classify_title;
use calman_core::color::DEFAULT_COLOR_ID;
use calman_core::event::{DisplayMode, EventDraft, EventRecord, EventTime};
use tracing::debug;

use crate::wire::{GoogleEvent, GoogleEventTime, GoogleTask};

/// Placeholder for events the provider returns without a summary.
pub const MISSING_TITLE: &str = "No Title";

/// Fixed color tasks are rendered with (outside the event palette).
pub const TASK_COLOR: &str = "#1c70e6ff";

fn event_time(wire: &GoogleEventTime) -> Option<EventTime> {
    if let Some(dt) = wire.date_time {
        Some(EventTime::DateTime(dt))
    } else {
        wire.date.map(EventTime::Date)
    }
}

/// Convert one wire event into a local record.
///
/// Returns `None` for records the window must not contain: cancelled
/// events, events without an id, and events without usable start/end.
pub fn record_from_event(event: GoogleEvent, phase_names: &[String]) -> Option<EventRecord> {
    if event.status == "cancelled" || event.id.is_empty() {
        return None;
    }

    let start = event.start.as_ref().and_then(event_time)?;
    let end = event.end.as_ref().and_then(event_time)?;
    let all_day = start.is_date();

    let title = match event.summary {
        Some(s) if !s.is_empty() => s,
        _ => MISSING_TITLE.to_string(),
    };

    let color_id = match event.color_id.as_deref() {
        Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
            debug!(raw, "unparseable colorId, using default");
            DEFAULT_COLOR_ID
        }),
        None => DEFAULT_COLOR_ID,
    };

    let display = classify_title(&title, all_day, phase_names, false);

    Some(EventRecord {
        id: Some(event.id),
        title,
        start,
        end,
        all_day,
        color_id,
        description: event.description.unwrap_or_default(),
        display,
        extended_props: BTreeMap::new(),
    })
}

/// Surface a provider task as an all-day, non-editable event on its due
/// date. Tasks without a due date are dropped.
pub fn record_from_task(task: GoogleTask) -> Option<EventRecord> {
    let due = task.due?;
    if task.id.is_empty() {
        return None;
    }
    let date = due.date_naive();

    let mut extended_props = BTreeMap::new();
    extended_props.insert("isTask".to_string(), serde_json::Value::Bool(true));
    if let Some(status) = task.status {
        extended_props.insert("taskStatus".to_string(), serde_json::Value::String(status));
    }
    if let Some(link) = task.web_view_link {
        extended_props.insert("url".to_string(), serde_json::Value::String(link));
    }
    extended_props.insert(
        "color".to_string(),
        serde_json::Value::String(TASK_COLOR.to_string()),
    );

    Some(EventRecord {
        id: Some(task.id),
        title: task.title.unwrap_or_else(|| MISSING_TITLE.to_string()),
        start: EventTime::Date(date),
        end: EventTime::Date(date),
        all_day: true,
        color_id: DEFAULT_COLOR_ID,
        description: String::new(),
        display: DisplayMode::Auto,
        extended_props,
    })
}

/// Build the wire body for a create or update from a UI draft.
///
/// An unset color (`-1`) is sent as the default id; Google wants the
/// id as a string.
pub fn event_from_draft(draft: &EventDraft, all_day: bool) -> GoogleEvent {
    let color_id = if draft.color_id < 0 {
        DEFAULT_COLOR_ID
    } else {
        draft.color_id
    };

    let (start, end) = if all_day {
        (
            GoogleEventTime {
                date: Some(draft.start.date_naive()),
                ..Default::default()
            },
            GoogleEventTime {
                date: Some(draft.end.date_naive()),
                ..Default::default()
            },
        )
    } else {
        (
            GoogleEventTime {
                date_time: Some(draft.start),
                time_zone: Some("UTC".to_string()),
                ..Default::default()
            },
            GoogleEventTime {
                date_time: Some(draft.end),
                time_zone: Some("UTC".to_string()),
                ..Default::default()
            },
        )
    };

    GoogleEvent {
        summary: Some(draft.title.clone()),
        description: if draft.description.is_empty() {
            None
        } else {
            Some(draft.description.clone())
        },
        start: Some(start),
        end: Some(end),
        color_id: Some(color_id.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn phases() -> Vec<String> {
        vec!["Arbeitszeit".to_string()]
    }

    fn timed(h: u32) -> GoogleEventTime {
        GoogleEventTime {
            date_time: Some(Utc.with_ymd_and_hms(2024, 6, 12, h, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_summary_gets_placeholder() {
        let event = GoogleEvent {
            id: "e1".to_string(),
            start: Some(timed(9)),
            end: Some(timed(10)),
            ..Default::default()
        };
        let record = record_from_event(event, &phases()).unwrap();
        assert_eq!(record.title, MISSING_TITLE);
        assert_eq!(record.color_id, DEFAULT_COLOR_ID);
        assert!(!record.all_day);
    }

    #[test]
    fn test_date_only_event_is_all_day() {
        let event = GoogleEvent {
            id: "e1".to_string(),
            summary: Some("Holiday".to_string()),
            start: Some(GoogleEventTime {
                date: Some(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()),
                ..Default::default()
            }),
            end: Some(GoogleEventTime {
                date: Some(NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let record = record_from_event(event, &phases()).unwrap();
        assert!(record.all_day);
    }

    #[test]
    fn test_cancelled_and_idless_events_are_dropped() {
        let cancelled = GoogleEvent {
            id: "e1".to_string(),
            status: "cancelled".to_string(),
            start: Some(timed(9)),
            end: Some(timed(10)),
            ..Default::default()
        };
        assert!(record_from_event(cancelled, &phases()).is_none());

        let no_id = GoogleEvent {
            start: Some(timed(9)),
            end: Some(timed(10)),
            ..Default::default()
        };
        assert!(record_from_event(no_id, &phases()).is_none());
    }

    #[test]
    fn test_phase_event_is_preclassified_as_background() {
        let event = GoogleEvent {
            id: "e1".to_string(),
            summary: Some("Arbeitszeit: focus".to_string()),
            start: Some(timed(9)),
            end: Some(timed(12)),
            ..Default::default()
        };
        let record = record_from_event(event, &phases()).unwrap();
        assert_eq!(record.display, DisplayMode::Background);
    }

    #[test]
    fn test_task_without_due_is_dropped() {
        let task = GoogleTask {
            id: "t1".to_string(),
            title: Some("Someday".to_string()),
            ..Default::default()
        };
        assert!(record_from_task(task).is_none());
    }

    #[test]
    fn test_task_surfaces_as_all_day_with_markers() {
        let task = GoogleTask {
            id: "t1".to_string(),
            title: Some("Pay rent".to_string()),
            due: Some(Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap()),
            status: Some("needsAction".to_string()),
            web_view_link: Some("https://tasks.google.com/t1".to_string()),
        };
        let record = record_from_task(task).unwrap();
        assert!(record.all_day);
        assert!(record.is_task());
        assert_eq!(
            record.start,
            EventTime::Date(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())
        );
        assert_eq!(
            record.extended_props["taskStatus"],
            serde_json::Value::String("needsAction".to_string())
        );
    }

    #[test]
    fn test_draft_with_unset_color_sends_default() {
        let draft = EventDraft {
            title: "Lunch".to_string(),
            start: Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 12, 13, 0, 0).unwrap(),
            color_id: -1,
            description: String::new(),
        };
        let wire = event_from_draft(&draft, false);
        assert_eq!(wire.color_id.as_deref(), Some("0"));
        assert!(wire.start.as_ref().unwrap().date_time.is_some());

        let all_day = event_from_draft(&draft, true);
        assert!(all_day.start.as_ref().unwrap().date.is_some());
        assert!(all_day.start.as_ref().unwrap().date_time.is_none());
    }
}

//! Provider-neutral event types.
//!
//! These types represent calendar events in a provider-agnostic way.
//! Data sources convert their API responses into these types, and the
//! sync engine works exclusively with them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CalmanError, CalmanResult};

/// How the UI should render an event: a normal editable block, or a
/// full-bleed non-interactive background block (phase blocks, weather).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Auto,
    Background,
}

/// A point in calendar time: either a timed instant or a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Resolve to an instant (dates resolve to midnight UTC).
    pub fn as_datetime(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        }
    }
}

/// A calendar event as held in the local window.
///
/// `id` is `None` only for records that were never confirmed by the
/// provider (synthetic weather overlay events). Every record that came
/// back from a fetch or a create carries the provider-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: Option<String>,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub color_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display: DisplayMode,
    #[serde(default)]
    pub extended_props: BTreeMap<String, serde_json::Value>,
}

impl EventRecord {
    /// Whether this record mirrors a provider task (all-day, non-editable).
    pub fn is_task(&self) -> bool {
        self.extended_props
            .get("isTask")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end.as_datetime() - self.start.as_datetime()).num_minutes()
    }
}

/// Mutable event fields as supplied by the UI for create/update/split.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Palette id; `-1` means "unset, use default".
    pub color_id: i64,
    pub description: String,
}

impl EventDraft {
    /// Validate the `end >= start` invariant before a draft is sent anywhere.
    pub fn validate(&self) -> CalmanResult<()> {
        if self.end < self.start {
            return Err(CalmanError::InvalidEvent(format!(
                "end {} is before start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.0
    }
}

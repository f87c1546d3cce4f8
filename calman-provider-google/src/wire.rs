//! Wire shapes for the Google Calendar v3 and Tasks v1 REST APIs.
//!
//! Only the fields the engine consumes are modeled; everything else in
//! the provider's JSON is ignored on deserialize and omitted on
//! serialize.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of a wire event: either a timed instant or an all-day
/// date, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<GoogleEventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<GoogleEventTime>,
    /// Google sends the color id as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleTask {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    /// Due timestamp (RFC 3339); tasks without one never surface.
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListResponse {
    #[serde(default)]
    pub items: Vec<GoogleTask>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_timed_and_all_day() {
        let json = r#"{
            "id": "abc123",
            "summary": "Standup",
            "colorId": "3",
            "status": "confirmed",
            "start": {"dateTime": "2024-06-12T09:00:00Z"},
            "end": {"dateTime": "2024-06-12T09:30:00Z"}
        }"#;
        let event: GoogleEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, "abc123");
        assert!(event.start.as_ref().unwrap().date_time.is_some());

        let all_day = r#"{
            "id": "d1",
            "start": {"date": "2024-06-12"},
            "end": {"date": "2024-06-13"}
        }"#;
        let event: GoogleEvent = serde_json::from_str(all_day).unwrap();
        assert!(event.start.as_ref().unwrap().date.is_some());
        assert!(event.start.as_ref().unwrap().date_time.is_none());
    }

    #[test]
    fn test_event_serializes_without_empty_fields() {
        let event = GoogleEvent {
            summary: Some("Lunch".to_string()),
            start: Some(GoogleEventTime {
                date: Some(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("dateTime"));
        assert!(json.contains("\"date\":\"2024-06-12\""));
    }

    #[test]
    fn test_task_with_offset_due_timestamp() {
        let json = r#"{"id": "t1", "title": "Pay rent", "due": "2024-06-14T00:00:00.000Z", "status": "needsAction"}"#;
        let task: GoogleTask = serde_json::from_str(json).unwrap();
        assert!(task.due.is_some());
    }
}

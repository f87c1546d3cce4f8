//! Raw REST calls against the Google Calendar v3 and Tasks v1 APIs.
//!
//! Every call maps HTTP 401 to `SourceError::AuthInvalid` so the engine
//! can surface a broken session, and everything else unexpected to
//! `SourceError::Provider`.

use calman_core::source::{SourceError, SourceResult};
use calman_core::window::FetchWindow;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::wire::{EventListResponse, GoogleEvent, GoogleTask, TaskListResponse};

const CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3";
const TASKS_BASE: &str = "https://tasks.googleapis.com/tasks/v1";

fn provider_err(context: &str, detail: impl std::fmt::Display) -> SourceError {
    SourceError::Provider(format!("{}: {}", context, detail))
}

async fn check(response: reqwest::Response, context: &str) -> SourceResult<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(SourceError::AuthInvalid);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(provider_err(context, format!("{} {}", status, body)));
    }
    Ok(response)
}

/// List events in a window, expanded to single instances and ordered by
/// start time.
pub async fn list_events(
    http: &reqwest::Client,
    token: &str,
    calendar_id: &str,
    window: &FetchWindow,
) -> SourceResult<Vec<GoogleEvent>> {
    let url = format!("{}/calendars/{}/events", CALENDAR_BASE, calendar_id);
    debug!(calendar_id, "listing events");

    let response = http
        .get(&url)
        .bearer_auth(token)
        .query(&[
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("showDeleted", "false"),
            ("maxResults", "2500"),
            ("timeMin", &window.time_min_rfc3339()),
            ("timeMax", &window.time_max_rfc3339()),
        ])
        .send()
        .await
        .map_err(|e| provider_err("Failed to list events", e))?;

    let response = check(response, "Event list request failed").await?;
    let list: EventListResponse = response
        .json()
        .await
        .map_err(|e| provider_err("Failed to parse event list", e))?;
    Ok(list.items)
}

pub async fn insert_event(
    http: &reqwest::Client,
    token: &str,
    calendar_id: &str,
    body: &GoogleEvent,
) -> SourceResult<GoogleEvent> {
    let url = format!("{}/calendars/{}/events", CALENDAR_BASE, calendar_id);

    let response = http
        .post(&url)
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .map_err(|e| provider_err("Failed to insert event", e))?;

    let response = check(response, "Event insert request failed").await?;
    response
        .json()
        .await
        .map_err(|e| provider_err("Failed to parse inserted event", e))
}

pub async fn update_event(
    http: &reqwest::Client,
    token: &str,
    calendar_id: &str,
    event_id: &str,
    body: &GoogleEvent,
) -> SourceResult<()> {
    let url = format!(
        "{}/calendars/{}/events/{}",
        CALENDAR_BASE, calendar_id, event_id
    );

    let response = http
        .put(&url)
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .map_err(|e| provider_err("Failed to update event", e))?;

    check(response, "Event update request failed").await?;
    Ok(())
}

/// Delete an event. Already-gone events (404/410) are treated as a
/// successful delete.
pub async fn delete_event(
    http: &reqwest::Client,
    token: &str,
    calendar_id: &str,
    event_id: &str,
) -> SourceResult<()> {
    let url = format!(
        "{}/calendars/{}/events/{}",
        CALENDAR_BASE, calendar_id, event_id
    );

    let response = http
        .delete(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| provider_err("Failed to delete event", e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        warn!(event_id, "event already gone on remote");
        return Ok(());
    }
    check(response, "Event delete request failed").await?;
    Ok(())
}

/// List the open tasks of the default task list.
pub async fn list_tasks(http: &reqwest::Client, token: &str) -> SourceResult<Vec<GoogleTask>> {
    let url = format!("{}/lists/@default/tasks", TASKS_BASE);

    let response = http
        .get(&url)
        .bearer_auth(token)
        .query(&[("showCompleted", "false"), ("showDeleted", "false")])
        .send()
        .await
        .map_err(|e| provider_err("Failed to list tasks", e))?;

    let response = check(response, "Task list request failed").await?;
    let list: TaskListResponse = response
        .json()
        .await
        .map_err(|e| provider_err("Failed to parse task list", e))?;
    Ok(list.items)
}

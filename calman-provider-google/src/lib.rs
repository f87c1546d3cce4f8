//! Google Calendar + Tasks data source for calman.
//!
//! Implements [`EventSource`] on top of the Calendar v3 and Tasks v1
//! REST APIs. One fetch combines both feeds into a single replacement
//! window: calendar events first, then open tasks surfaced as all-day
//! records.

pub mod api;
pub mod convert;
pub mod session;
pub mod wire;

use calman_core::event::{EventDraft, EventRecord};
use calman_core::source::{EventSource, SourceError, SourceResult};
use calman_core::window::FetchWindow;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use session::Session;

/// [`EventSource`] backed by a Google account.
pub struct GoogleSource {
    http: reqwest::Client,
    session: Option<Session>,
    calendar_id: String,
}

impl GoogleSource {
    pub fn new() -> Self {
        GoogleSource {
            http: reqwest::Client::new(),
            session: None,
            calendar_id: "primary".to_string(),
        }
    }

    pub fn with_calendar(calendar_id: impl Into<String>) -> Self {
        GoogleSource {
            calendar_id: calendar_id.into(),
            ..GoogleSource::new()
        }
    }

    /// Run the interactive OAuth flow, replacing any stored session.
    pub async fn authenticate_interactive(&mut self) -> anyhow::Result<()> {
        let session = session::authenticate(&self.http).await?;
        self.session = Some(session);
        info!("Google authentication complete");
        Ok(())
    }

    async fn token(&mut self) -> SourceResult<String> {
        let session = self.session.as_mut().ok_or(SourceError::AuthInvalid)?;
        session.access_token(&self.http).await.map_err(|e| {
            warn!("token refresh failed: {e:#}");
            SourceError::AuthInvalid
        })
    }
}

impl Default for GoogleSource {
    fn default() -> Self {
        GoogleSource::new()
    }
}

impl EventSource for GoogleSource {
    async fn login(&mut self) -> SourceResult<bool> {
        let Some(mut session) = Session::load()
            .map_err(|e| SourceError::Provider(format!("failed to load session: {e:#}")))?
        else {
            debug!("no stored Google session");
            return Ok(false);
        };

        if session.is_expired() {
            if let Err(e) = session.access_token(&self.http).await {
                // A dead refresh token is an expected outcome of a silent
                // login, not a provider fault.
                debug!("silent refresh failed: {e:#}");
                return Ok(false);
            }
        }

        self.session = Some(session);
        Ok(true)
    }

    async fn fetch_window(
        &mut self,
        date: DateTime<Utc>,
        phase_names: &[String],
    ) -> SourceResult<Vec<EventRecord>> {
        let token = self.token().await?;
        let window = FetchWindow::around(date);

        let events = api::list_events(&self.http, &token, &self.calendar_id, &window).await?;
        let tasks = api::list_tasks(&self.http, &token).await?;

        let mut records: Vec<EventRecord> = events
            .into_iter()
            .filter_map(|e| convert::record_from_event(e, phase_names))
            .collect();
        records.extend(
            tasks
                .into_iter()
                .filter_map(convert::record_from_task)
                .filter(|r| window.contains(r.start.as_datetime())),
        );

        debug!(count = records.len(), "fetched window");
        Ok(records)
    }

    async fn create_event(
        &mut self,
        draft: &EventDraft,
        all_day: bool,
    ) -> SourceResult<EventRecord> {
        let token = self.token().await?;
        let body = convert::event_from_draft(draft, all_day);
        let created = api::insert_event(&self.http, &token, &self.calendar_id, &body).await?;
        convert::record_from_event(created, &[])
            .ok_or_else(|| SourceError::Provider("created event came back unusable".to_string()))
    }

    async fn update_event(
        &mut self,
        draft: &EventDraft,
        event_id: &str,
        all_day: bool,
    ) -> SourceResult<()> {
        let token = self.token().await?;
        let body = convert::event_from_draft(draft, all_day);
        api::update_event(&self.http, &token, &self.calendar_id, event_id, &body).await
    }

    async fn delete_event(&mut self, event_id: &str) -> SourceResult<()> {
        let token = self.token().await?;
        api::delete_event(&self.http, &token, &self.calendar_id, event_id).await
    }
}

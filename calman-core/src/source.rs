//! The data-source boundary.
//!
//! The sync engine drives a remote provider exclusively through
//! [`EventSource`]. Expected failures are values, never panics: a call
//! that hits invalid authentication returns [`SourceError::AuthInvalid`],
//! a transient provider/network failure returns
//! [`SourceError::Provider`]. The engine maps these onto its auth and
//! busy state without retrying.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::{EventDraft, EventRecord};

/// Why a data-source call produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Authentication is no longer valid; the caller must re-authenticate
    /// before further calls can succeed.
    #[error("authentication is no longer valid")]
    AuthInvalid,

    /// Transient provider or network failure; local state must be left
    /// unchanged and the operation is not retried.
    #[error("provider error: {0}")]
    Provider(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Abstract boundary to a remote calendar provider (events + tasks).
///
/// All methods are fallible in the two ways above. `fetch_window` must
/// return a complete replacement set for the three-week window around
/// `date`, combining the event feed and the task feed into one
/// sequence; task records are surfaced as all-day events carrying
/// `extendedProps.isTask = true`.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Attempt to authenticate. `Ok(false)` is an expected auth failure
    /// (no stored session, user declined), not an error.
    async fn login(&mut self) -> SourceResult<bool>;

    /// Fetch the full replacement window around `date`. `phase_names`
    /// is forwarded so converters can pre-classify phase blocks.
    async fn fetch_window(
        &mut self,
        date: DateTime<Utc>,
        phase_names: &[String],
    ) -> SourceResult<Vec<EventRecord>>;

    /// Create an event; returns the remote-confirmed record (with the
    /// provider-assigned id).
    async fn create_event(&mut self, draft: &EventDraft, all_day: bool)
    -> SourceResult<EventRecord>;

    /// Update the mutable fields of an existing event.
    async fn update_event(
        &mut self,
        draft: &EventDraft,
        event_id: &str,
        all_day: bool,
    ) -> SourceResult<()>;

    async fn delete_event(&mut self, event_id: &str) -> SourceResult<()>;
}

//! The event synchronization and mutation engine.
//!
//! Owns the authoritative local event window and all sync state, and
//! drives an [`EventSource`] for every remote interaction. Exactly one
//! remote operation may be in flight at a time: the busy flag is a
//! mutex, not a queue, so operations issued while busy are refused
//! (returning `false`), never buffered. The 20-second poll and
//! user-triggered syncs share that mutex and can never overlap.
//!
//! Every mutating operation returns whether it changed the window.
//! Expected remote failures leave the window untouched; the engine
//! never panics for them.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::classify;
use crate::event::{EventDraft, EventRecord};
use crate::source::{EventSource, SourceError, SourceResult};
use crate::split::split_bounds;
use crate::weather::{self, DailyForecast};

/// Poll period while sync is on.
pub const SYNC_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(20);

/// Engine status flags, read-shared with the UI surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncState {
    pub is_logged_in: bool,
    /// Set when a remote call reported invalid auth; cleared by the
    /// next call that succeeds. The UI must treat this as "blocked,
    /// show re-auth".
    pub is_auth_loading: bool,
    /// The global mutex: no mutating operation may start while set.
    pub is_currently_loading: bool,
    pub is_sync_on: bool,
}

/// Week navigation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekSwitch {
    Prev,
    Next,
    Today,
}

/// Settings the engine needs from the UI surface.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub phase_names: Vec<String>,
    /// Rounding granularity for splits, in minutes.
    pub rounding_value: i64,
    pub round_splits: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            phase_names: crate::settings::default_phases(),
            rounding_value: crate::settings::DEFAULT_ROUNDING_VALUE,
            round_splits: crate::settings::DEFAULT_ROUND_SPLITS,
        }
    }
}

pub struct SyncEngine<S: EventSource> {
    source: S,
    events: Vec<EventRecord>,
    events_loaded: bool,
    state: SyncState,
    date_in_view: DateTime<Utc>,
    bg_events_editable: bool,
    weather_overlay_on: bool,
    settings: EngineSettings,
}

impl<S: EventSource> SyncEngine<S> {
    pub fn new(source: S, settings: EngineSettings) -> Self {
        SyncEngine {
            source,
            events: Vec::new(),
            events_loaded: false,
            state: SyncState::default(),
            date_in_view: Utc::now(),
            bg_events_editable: false,
            weather_overlay_on: false,
            settings,
        }
    }

    // --- Read-shared state ---

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn events_loaded(&self) -> bool {
        self.events_loaded
    }

    pub fn sync_state(&self) -> SyncState {
        self.state
    }

    pub fn date_in_view(&self) -> DateTime<Utc> {
        self.date_in_view
    }

    pub fn bg_events_editable(&self) -> bool {
        self.bg_events_editable
    }

    pub fn weather_overlay_on(&self) -> bool {
        self.weather_overlay_on
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Replace the engine's settings snapshot (phase list, rounding).
    /// Takes effect on the next classification or split.
    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    // --- Auth ---

    /// Attempt to authenticate against the data source.
    pub async fn login(&mut self) -> bool {
        match self.source.login().await {
            Ok(true) => {
                self.state.is_logged_in = true;
                self.state.is_auth_loading = false;
                true
            }
            Ok(false) => {
                debug!("login did not complete");
                false
            }
            Err(e) => {
                self.note_failure("login", &e);
                false
            }
        }
    }

    // --- Window operations ---

    /// Fetch a full replacement window around `date` (defaults to the
    /// viewed date). Refused while logged out, busy, or while the
    /// weather overlay substitutes for the real window.
    pub async fn load_events(&mut self, date: Option<DateTime<Utc>>) -> bool {
        if !self.guard("load_events") {
            return false;
        }
        if self.weather_overlay_on {
            debug!("load_events skipped: weather overlay active");
            return false;
        }
        let date = date.unwrap_or(self.date_in_view);

        self.state.is_currently_loading = true;
        let result = self
            .source
            .fetch_window(date, &self.settings.phase_names)
            .await;
        self.state.is_currently_loading = false;

        match self.note_auth(result) {
            Some(mut events) => {
                classify::reclassify_all(
                    &mut events,
                    &self.settings.phase_names,
                    self.bg_events_editable,
                );
                debug!(count = events.len(), "window replaced");
                self.date_in_view = date;
                self.events = events;
                self.events_loaded = true;
                true
            }
            None => false,
        }
    }

    /// Create an event and append the remote-confirmed record. There is
    /// no optimistic placeholder: the window only ever holds records
    /// with provider-assigned ids.
    pub async fn add_event(&mut self, draft: &EventDraft, all_day: bool) -> bool {
        if !self.guard("add_event") {
            return false;
        }

        self.state.is_currently_loading = true;
        let result = self.source.create_event(draft, all_day).await;
        self.state.is_currently_loading = false;

        match self.note_auth(result) {
            Some(mut record) => {
                record.display = classify::classify(
                    &record,
                    &self.settings.phase_names,
                    self.bg_events_editable,
                );
                self.events.push(record);
                true
            }
            None => false,
        }
    }

    /// Delete an event and drop the matching record.
    pub async fn remove_event(&mut self, event_id: &str) -> bool {
        if !self.guard("remove_event") {
            return false;
        }

        self.state.is_currently_loading = true;
        let result = self.source.delete_event(event_id).await;
        self.state.is_currently_loading = false;

        match self.note_auth(result) {
            Some(()) => {
                self.events.retain(|e| e.id.as_deref() != Some(event_id));
                true
            }
            None => false,
        }
    }

    /// Update an event in place, preserving its id and window position.
    pub async fn edit_event(&mut self, draft: &EventDraft, event_id: &str, all_day: bool) -> bool {
        if !self.guard("edit_event") {
            return false;
        }

        self.state.is_currently_loading = true;
        let result = self.source.update_event(draft, event_id, all_day).await;
        self.state.is_currently_loading = false;

        match self.note_auth(result) {
            Some(()) => {
                let display = classify::classify_title(
                    &draft.title,
                    all_day,
                    &self.settings.phase_names,
                    self.bg_events_editable,
                );
                if let Some(record) = self
                    .events
                    .iter_mut()
                    .find(|e| e.id.as_deref() == Some(event_id))
                {
                    record.title = draft.title.clone();
                    record.start = crate::event::EventTime::DateTime(draft.start);
                    record.end = crate::event::EventTime::DateTime(draft.end);
                    record.all_day = all_day;
                    record.color_id = draft.color_id;
                    record.description = draft.description.clone();
                    record.display = display;
                }
                true
            }
            None => false,
        }
    }

    /// Replace one event with two halves at `percent`.
    ///
    /// The original is deleted before the two creates are confirmed; if
    /// a create fails, its half is simply not added to the window. That
    /// window of event loss is a long-standing behavior of the split
    /// flow and is deliberately kept.
    pub async fn split_event(
        &mut self,
        draft: &EventDraft,
        event_id: &str,
        all_day: bool,
        percent: f64,
    ) -> bool {
        if !self.guard("split_event") {
            return false;
        }
        if !(0.0..100.0).contains(&percent) || percent == 0.0 {
            warn!(percent, "split percent out of range");
            return false;
        }

        self.state.is_currently_loading = true;
        let outcome = self.split_inner(draft, event_id, all_day, percent).await;
        self.state.is_currently_loading = false;
        outcome
    }

    async fn split_inner(
        &mut self,
        draft: &EventDraft,
        event_id: &str,
        all_day: bool,
        percent: f64,
    ) -> bool {
        let delete = self.source.delete_event(event_id).await;
        if self.note_auth(delete).is_none() {
            return false;
        }

        let rounding = self
            .settings
            .round_splits
            .then_some(self.settings.rounding_value);
        let bounds = split_bounds(draft.start, draft.end, percent, rounding);

        let first = EventDraft {
            end: bounds.first_end,
            ..draft.clone()
        };
        let second = EventDraft {
            start: bounds.second_start,
            ..draft.clone()
        };

        // The original id is gone remotely; drop it locally regardless
        // of how the creates fare.
        self.events.retain(|e| e.id.as_deref() != Some(event_id));

        let mut all_created = true;
        for half in [first, second] {
            let created = self.source.create_event(&half, all_day).await;
            match self.note_auth(created) {
                Some(mut record) => {
                    record.display = classify::classify(
                        &record,
                        &self.settings.phase_names,
                        self.bg_events_editable,
                    );
                    self.events.push(record);
                }
                None => {
                    warn!(title = %half.title, "split half was not created; event data lost");
                    all_created = false;
                }
            }
        }
        all_created
    }

    // --- Navigation and toggles ---

    /// Move the viewed week and reload, unless suppressed. Refused
    /// while a remote call is in flight.
    pub async fn switch_week(&mut self, direction: WeekSwitch, suppress_reload: bool) -> bool {
        if self.state.is_currently_loading {
            return false;
        }
        self.date_in_view = match direction {
            WeekSwitch::Today => Utc::now(),
            WeekSwitch::Prev => self.date_in_view - chrono::Duration::weeks(1),
            WeekSwitch::Next => self.date_in_view + chrono::Duration::weeks(1),
        };
        if !suppress_reload {
            self.load_events(Some(self.date_in_view)).await;
        }
        true
    }

    /// Toggle background sync. Turning it on triggers an immediate
    /// reload when logged in and idle.
    pub async fn set_sync_on(&mut self, on: bool) {
        self.state.is_sync_on = on;
        if on && self.state.is_logged_in && !self.state.is_currently_loading {
            self.load_events(None).await;
        }
    }

    /// One poll-timer fire: reload if sync is on and the engine is
    /// idle. The caller re-arms the timer only after this completes, so
    /// at most one timer is ever live.
    pub async fn poll_tick(&mut self) -> bool {
        if self.state.is_sync_on && self.state.is_logged_in && !self.state.is_currently_loading {
            self.load_events(None).await
        } else {
            false
        }
    }

    /// Unlock/relock phase blocks. Recomputes `display` for every
    /// loaded event with no remote call.
    pub fn set_bg_events_editable(&mut self, editable: bool) {
        self.bg_events_editable = editable;
        classify::reclassify_all(&mut self.events, &self.settings.phase_names, editable);
    }

    /// Activate the weather overlay: the synthetic events fully replace
    /// the window. Deactivating reloads the real window immediately.
    pub async fn set_weather_overlay(&mut self, forecasts: Option<&[DailyForecast]>) {
        match forecasts {
            Some(days) => {
                self.weather_overlay_on = true;
                self.events = weather::build_overlay_events(days);
            }
            None => {
                self.weather_overlay_on = false;
                self.load_events(None).await;
            }
        }
    }

    // --- Internals ---

    /// Common precondition for mutating operations: logged in and idle.
    fn guard(&self, op: &str) -> bool {
        if !self.state.is_logged_in {
            debug!(op, "refused: not logged in");
            return false;
        }
        if self.state.is_currently_loading {
            warn!(op, "refused: another operation is in flight");
            return false;
        }
        true
    }

    /// Track auth validity from a call result and unwrap it. A success
    /// marks auth valid; `AuthInvalid` blocks the UI until a later call
    /// succeeds; provider failures leave auth state as-is.
    fn note_auth<T>(&mut self, result: SourceResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.state.is_auth_loading = false;
                Some(value)
            }
            Err(e) => {
                self.note_failure("remote call", &e);
                None
            }
        }
    }

    fn note_failure(&mut self, op: &str, error: &SourceError) {
        match error {
            SourceError::AuthInvalid => {
                warn!(op, "auth no longer valid");
                self.state.is_auth_loading = true;
            }
            SourceError::Provider(msg) => {
                debug!(op, %msg, "provider failure, local state unchanged");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DisplayMode, EventTime};
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use std::collections::VecDeque;

    /// Scripted data source: pops pre-programmed responses and records
    /// every call it receives.
    #[derive(Default)]
    struct MockSource {
        login_ok: bool,
        fetches: VecDeque<SourceResult<Vec<EventRecord>>>,
        creates: VecDeque<SourceResult<EventRecord>>,
        updates: VecDeque<SourceResult<()>>,
        deletes: VecDeque<SourceResult<()>>,
        calls: Vec<String>,
    }

    impl EventSource for MockSource {
        async fn login(&mut self) -> SourceResult<bool> {
            self.calls.push("login".to_string());
            Ok(self.login_ok)
        }

        async fn fetch_window(
            &mut self,
            _date: DateTime<Utc>,
            _phase_names: &[String],
        ) -> SourceResult<Vec<EventRecord>> {
            self.calls.push("fetch".to_string());
            self.fetches.pop_front().unwrap_or(Ok(vec![]))
        }

        async fn create_event(
            &mut self,
            draft: &EventDraft,
            all_day: bool,
        ) -> SourceResult<EventRecord> {
            self.calls.push(format!("create:{}", draft.title));
            self.creates
                .pop_front()
                .unwrap_or_else(|| Ok(confirmed(draft, all_day)))
        }

        async fn update_event(
            &mut self,
            _draft: &EventDraft,
            event_id: &str,
            _all_day: bool,
        ) -> SourceResult<()> {
            self.calls.push(format!("update:{event_id}"));
            self.updates.pop_front().unwrap_or(Ok(()))
        }

        async fn delete_event(&mut self, event_id: &str) -> SourceResult<()> {
            self.calls.push(format!("delete:{event_id}"));
            self.deletes.pop_front().unwrap_or(Ok(()))
        }
    }

    fn confirmed(draft: &EventDraft, all_day: bool) -> EventRecord {
        EventRecord {
            id: Some(format!("remote-{}", draft.title)),
            title: draft.title.clone(),
            start: EventTime::DateTime(draft.start),
            end: EventTime::DateTime(draft.end),
            all_day,
            color_id: draft.color_id.max(0),
            description: draft.description.clone(),
            display: DisplayMode::Auto,
            extended_props: BTreeMap::new(),
        }
    }

    fn record(id: &str, title: &str) -> EventRecord {
        EventRecord {
            id: Some(id.to_string()),
            title: title.to_string(),
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap()),
            end: EventTime::DateTime(Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap()),
            all_day: false,
            color_id: 0,
            description: String::new(),
            display: DisplayMode::Auto,
            extended_props: BTreeMap::new(),
        }
    }

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start: Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap(),
            color_id: 1,
            description: String::new(),
        }
    }

    fn logged_in_engine(source: MockSource) -> SyncEngine<MockSource> {
        let mut engine = SyncEngine::new(source, EngineSettings::default());
        engine.state.is_logged_in = true;
        engine
    }

    #[tokio::test]
    async fn test_load_replaces_entire_window() {
        let mut source = MockSource::default();
        source
            .fetches
            .push_back(Ok(vec![record("a", "Old"), record("b", "Stale")]));
        source.fetches.push_back(Ok(vec![record("c", "Fresh")]));
        let mut engine = logged_in_engine(source);

        assert!(engine.load_events(None).await);
        assert_eq!(engine.events().len(), 2);

        assert!(engine.load_events(None).await);
        // Nothing from the previous window survives.
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.events()[0].id.as_deref(), Some("c"));
        assert!(engine.events_loaded());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_window_and_clears_busy() {
        let mut source = MockSource::default();
        source.fetches.push_back(Ok(vec![record("a", "Keep")]));
        source
            .fetches
            .push_back(Err(SourceError::Provider("timeout".to_string())));
        let mut engine = logged_in_engine(source);

        engine.load_events(None).await;
        assert!(!engine.load_events(None).await);
        assert_eq!(engine.events().len(), 1);
        assert!(!engine.sync_state().is_currently_loading);
    }

    #[tokio::test]
    async fn test_load_refused_when_logged_out() {
        let mut engine = SyncEngine::new(MockSource::default(), EngineSettings::default());
        assert!(!engine.load_events(None).await);
        assert!(engine.source.calls.is_empty());
    }

    #[tokio::test]
    async fn test_busy_mutex_refuses_add_without_calling_source() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.events.push(record("a", "Existing"));
        engine.state.is_currently_loading = true;

        assert!(!engine.add_event(&draft("New"), false).await);
        assert_eq!(engine.events().len(), 1);
        assert!(engine.source.calls.is_empty());
    }

    #[tokio::test]
    async fn test_add_appends_remote_confirmed_record() {
        let mut engine = logged_in_engine(MockSource::default());
        assert!(engine.add_event(&draft("Dentist"), false).await);
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.events()[0].id.as_deref(), Some("remote-Dentist"));
    }

    #[tokio::test]
    async fn test_add_applies_classification() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.add_event(&draft("Arbeitszeit: focus"), false).await;
        assert_eq!(engine.events()[0].display, DisplayMode::Background);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_window_unchanged() {
        let mut source = MockSource::default();
        source
            .creates
            .push_back(Err(SourceError::Provider("500".to_string())));
        let mut engine = logged_in_engine(source);

        assert!(!engine.add_event(&draft("Doomed"), false).await);
        assert!(engine.events().is_empty());
    }

    #[tokio::test]
    async fn test_remove_drops_matching_record() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.events.push(record("a", "One"));
        engine.events.push(record("b", "Two"));

        assert!(engine.remove_event("a").await);
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.events()[0].id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_edit_updates_in_place_preserving_position() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.events.push(record("a", "First"));
        engine.events.push(record("b", "Second"));

        let mut d = draft("Renamed");
        d.color_id = 3;
        assert!(engine.edit_event(&d, "a", false).await);

        assert_eq!(engine.events()[0].id.as_deref(), Some("a"));
        assert_eq!(engine.events()[0].title, "Renamed");
        assert_eq!(engine.events()[0].color_id, 3);
        assert_eq!(engine.events()[1].title, "Second");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_untouched() {
        let mut source = MockSource::default();
        source
            .updates
            .push_back(Err(SourceError::Provider("500".to_string())));
        let mut engine = logged_in_engine(source);
        engine.events.push(record("a", "Original"));

        assert!(!engine.edit_event(&draft("Changed"), "a", false).await);
        assert_eq!(engine.events()[0].title, "Original");
    }

    #[tokio::test]
    async fn test_split_replaces_original_with_two_halves() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.events.push(record("orig", "Long block"));

        assert!(
            engine
                .split_event(&draft("Long block"), "orig", false, 25.0)
                .await
        );

        assert_eq!(engine.events().len(), 2);
        assert!(engine.events().iter().all(|e| e.id.as_deref() != Some("orig")));
        // delete first, then two creates
        assert_eq!(
            engine.source.calls,
            vec!["delete:orig", "create:Long block", "create:Long block"]
        );

        // 120 minutes at 25%: [10:00, 10:30] and [11:30, 12:00]
        let first = &engine.events()[0];
        let second = &engine.events()[1];
        assert_eq!(
            first.end.as_datetime(),
            Utc.with_ymd_and_hms(2024, 6, 12, 10, 30, 0).unwrap()
        );
        assert_eq!(
            second.start.as_datetime(),
            Utc.with_ymd_and_hms(2024, 6, 12, 11, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_split_aborts_before_delete_failure_commits_anything() {
        let mut source = MockSource::default();
        source
            .deletes
            .push_back(Err(SourceError::Provider("gone".to_string())));
        let mut engine = logged_in_engine(source);
        engine.events.push(record("orig", "Long block"));

        assert!(
            !engine
                .split_event(&draft("Long block"), "orig", false, 50.0)
                .await
        );
        // Delete failed: the original stays, nothing was created.
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.source.calls, vec!["delete:orig"]);
    }

    #[tokio::test]
    async fn test_split_partial_create_failure_loses_failed_half_only() {
        // Known weak point: the delete has already happened, so a
        // failed create means that half is gone.
        let mut source = MockSource::default();
        source.creates.push_back(Err(SourceError::Provider(
            "create failed".to_string(),
        )));
        let mut engine = logged_in_engine(source);
        engine.events.push(record("orig", "Long block"));

        assert!(
            !engine
                .split_event(&draft("Long block"), "orig", false, 50.0)
                .await
        );
        // Original removed, only the second half made it.
        assert_eq!(engine.events().len(), 1);
        assert_ne!(engine.events()[0].id.as_deref(), Some("orig"));
        assert!(!engine.sync_state().is_currently_loading);
    }

    #[tokio::test]
    async fn test_switch_week_advances_by_one_week() {
        let mut engine = logged_in_engine(MockSource::default());
        let before = engine.date_in_view();
        engine.switch_week(WeekSwitch::Next, true).await;
        assert_eq!(engine.date_in_view() - before, chrono::Duration::weeks(1));
        engine.switch_week(WeekSwitch::Prev, true).await;
        assert_eq!(engine.date_in_view(), before);
        // Suppressed reloads never touch the source.
        assert!(engine.source.calls.is_empty());
    }

    #[tokio::test]
    async fn test_switch_week_triggers_reload() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.switch_week(WeekSwitch::Next, false).await;
        assert_eq!(engine.source.calls, vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_switch_week_refused_while_busy() {
        let mut engine = logged_in_engine(MockSource::default());
        let before = engine.date_in_view();
        engine.state.is_currently_loading = true;

        assert!(!engine.switch_week(WeekSwitch::Next, false).await);
        assert_eq!(engine.date_in_view(), before);
        assert!(engine.source.calls.is_empty());
    }

    #[tokio::test]
    async fn test_set_sync_on_triggers_immediate_load() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.set_sync_on(true).await;
        assert!(engine.sync_state().is_sync_on);
        assert_eq!(engine.source.calls, vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_poll_tick_noop_when_sync_off_or_logged_out() {
        let mut engine = logged_in_engine(MockSource::default());
        assert!(!engine.poll_tick().await);
        assert!(engine.source.calls.is_empty());

        engine.state.is_sync_on = true;
        engine.state.is_logged_in = false;
        assert!(!engine.poll_tick().await);
        assert!(engine.source.calls.is_empty());
    }

    #[tokio::test]
    async fn test_poll_tick_loads_when_idle() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.state.is_sync_on = true;
        assert!(engine.poll_tick().await);
        assert_eq!(engine.source.calls, vec!["fetch"]);
    }

    #[tokio::test]
    async fn test_auth_invalid_sets_auth_loading_until_next_success() {
        let mut source = MockSource::default();
        source.fetches.push_back(Err(SourceError::AuthInvalid));
        source.fetches.push_back(Ok(vec![]));
        let mut engine = logged_in_engine(source);

        engine.load_events(None).await;
        assert!(engine.sync_state().is_auth_loading);

        engine.load_events(None).await;
        assert!(!engine.sync_state().is_auth_loading);
    }

    #[tokio::test]
    async fn test_bg_edit_toggle_reclassifies_without_remote_call() {
        let mut engine = logged_in_engine(MockSource::default());
        engine.events.push(record("a", "Arbeitszeit: block"));
        engine.events.push(record("b", "Dentist"));
        classify::reclassify_all(
            &mut engine.events,
            &engine.settings.phase_names.clone(),
            false,
        );
        assert_eq!(engine.events()[0].display, DisplayMode::Background);

        engine.set_bg_events_editable(true);
        assert_eq!(engine.events()[0].display, DisplayMode::Auto);
        assert_eq!(engine.events()[1].display, DisplayMode::Auto);
        assert!(engine.source.calls.is_empty());

        engine.set_bg_events_editable(false);
        assert_eq!(engine.events()[0].display, DisplayMode::Background);
    }

    #[tokio::test]
    async fn test_weather_overlay_replaces_window_and_restores_on_disable() {
        let mut source = MockSource::default();
        source.fetches.push_back(Ok(vec![record("a", "Real")]));
        let mut engine = logged_in_engine(source);
        engine.events.push(record("a", "Real"));

        let forecast = DailyForecast {
            date: chrono::NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            sunrise: chrono::NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
            sunset: chrono::NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            hourly: vec![crate::weather::HourlySample {
                temperature: 20.0,
                condition: "Sunny".to_string(),
            }],
        };

        engine.set_weather_overlay(Some(&[forecast])).await;
        assert!(engine.weather_overlay_on());
        assert_eq!(engine.events().len(), 2);
        assert!(engine.events().iter().all(|e| e.id.is_none()));

        // Polling while the overlay is active must not clobber it.
        engine.state.is_sync_on = true;
        assert!(!engine.poll_tick().await);
        assert!(engine.source.calls.is_empty());

        engine.set_weather_overlay(None).await;
        assert!(!engine.weather_overlay_on());
        assert_eq!(engine.source.calls, vec!["fetch"]);
        assert_eq!(engine.events()[0].title, "Real");
    }
}

//! Core engine for calman.
//!
//! This crate keeps a local, editable mirror of a remote event set
//! consistent under optimistic writes, periodic polling, synthetic
//! overlay data and destructive transformations:
//! - `event` — the canonical in-memory event shape
//! - `source` — the data-source boundary (`EventSource`)
//! - `engine` — the sync engine (window ownership, mutex, polling)
//! - `classify`, `split`, `color`, `window` — event transformations
//! - `template`, `settings`, `store` — persisted UI collaborator state
//! - `weather` — synthetic overlay events

pub mod classify;
pub mod color;
pub mod engine;
pub mod error;
pub mod event;
pub mod settings;
pub mod source;
pub mod split;
pub mod store;
pub mod template;
pub mod weather;
pub mod window;

pub use engine::{EngineSettings, SyncEngine, SyncState, WeekSwitch, SYNC_POLL_INTERVAL};
pub use error::{CalmanError, CalmanResult};
pub use event::{DisplayMode, EventDraft, EventRecord, EventTime};
pub use source::{EventSource, SourceError, SourceResult};

//! Core domain logic for Taskpad.
//! This crate is the single source of truth for note and overlay invariants.

pub mod compose;
pub mod config;
pub mod db;
pub mod dictation;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod reminder;
pub mod repo;
pub mod search;
pub mod service;
pub mod session;

pub use compose::{NoteComposer, SubmittedNote};
pub use config::CoreConfig;
pub use dictation::{DictationEngine, DictationError, DictationSession, HostTranscriptEngine};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::draft::NoteDraft;
pub use model::note::{Category, Note, NoteId, NoteValidationError, Priority};
pub use model::timestamp::ReminderAt;
pub use overlay::{
    advance, DragDelta, DragInput, MotionConfig, MotionEvent, OverlayController, OverlayKind,
    OverlayMotionState, OverlayPhase,
};
pub use reminder::{
    HostPermissions, NotificationPermissions, PermissionStatus, QueuedReminder,
    QueuedReminderScheduler, ReminderBridge, ReminderError, ReminderOutcome, ReminderRequest,
    ReminderScheduler, ScheduleHandle,
};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::note_snapshot::{load_notes, save_notes, SnapshotError};
pub use search::filter::{filter_notes, NoteFilter};
pub use service::clock::{Clock, ManualClock, SystemClock};
pub use service::note_store::NoteStore;
pub use session::{AppSession, SessionServices};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

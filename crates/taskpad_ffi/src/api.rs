//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Hold the single process-wide app session and its host adapters.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every failure is returned as a message; validation messages are
//!   user-facing, everything else is diagnostic.

use log::{error, warn};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use taskpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppSession, Category, CoreConfig, DragDelta, DragInput, HostPermissions, HostTranscriptEngine,
    KeyValueStore, MemoryKeyValueStore, MotionEvent, Note, NoteId, OverlayKind, PermissionStatus,
    Priority, QueuedReminder, QueuedReminderScheduler, ReminderAt, ReminderOutcome,
    SessionServices, SqliteKeyValueStore, SystemClock,
};

static SESSION: OnceLock<Mutex<HostSession>> = OnceLock::new();

/// App session plus the host-side ends of its platform adapters.
struct HostSession {
    app: AppSession,
    permissions: HostPermissions,
    reminders: QueuedReminderScheduler,
    dictation: HostTranscriptEngine,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - A blank `level` uses `TASKPAD_LOG_LEVEL`, else the build default.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let config = CoreConfig::from_env();
    match init_logging_inner(config.effective_log_level(&level), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note row as rendered by the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub text: String,
    pub created_date: String,
    pub created_time: String,
    /// `personal|work|school`.
    pub category: String,
    /// `low|normal|high`.
    pub priority: String,
    /// ISO-8601 UTC with milliseconds.
    pub reminder_at: String,
    pub completed: bool,
}

/// Visible note list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub items: Vec<NoteItem>,
    /// Query the list was filtered with.
    pub query: String,
    pub total: u32,
    pub message: String,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Affected note id, when the action targets one.
    pub note_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Creation-sheet draft snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    pub text: String,
    pub category: String,
    pub priority: String,
    pub reminder_at: String,
    pub listening: bool,
}

/// Overlay render state.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStateItem {
    pub kind: String,
    pub phase: String,
    pub offset: f64,
    pub visible: bool,
}

/// Milestone produced by `overlay_tick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEventItem {
    pub kind: String,
    /// `opened|closed|settled_open`.
    pub event: String,
}

/// Reminder the host must hand to the platform notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminderItem {
    pub handle: String,
    pub title: String,
    pub body: String,
    pub fire_at: String,
    pub fire_at_epoch_ms: i64,
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

/// Lists notes visible under `query`.
///
/// `None` keeps the current query; `Some` replaces it.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list(query: Option<String>) -> NotesListResponse {
    let result = with_session(|session| {
        if let Some(query) = query {
            session.app.set_search_query(query);
        }
        let items = session
            .app
            .visible_notes()
            .into_iter()
            .map(to_note_item)
            .collect::<Vec<_>>();
        (
            items,
            session.app.search_query().to_string(),
            session.app.notes().len(),
        )
    });

    match result {
        Ok((items, query, total)) => {
            let message = if items.is_empty() {
                "No notes.".to_string()
            } else {
                format!("{} note(s).", items.len())
            };
            NotesListResponse {
                items,
                query,
                total: u32::try_from(total).unwrap_or(u32::MAX),
                message,
            }
        }
        Err(err) => NotesListResponse {
            items: Vec::new(),
            query: String::new(),
            total: 0,
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note from the current draft and schedules its reminder.
///
/// On validation failure `message` is the user-facing alert text.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create() -> ActionResponse {
    let result = with_session(|session| session.app.submit_note());
    match result {
        Ok(Ok(submitted)) => {
            let message = match submitted.reminder {
                ReminderOutcome::Scheduled(_) => "Note created. Reminder scheduled.",
                ReminderOutcome::SkippedPastDue => "Note created. Reminder time has passed.",
                ReminderOutcome::SkippedPermission | ReminderOutcome::Failed(_) => "Note created.",
            };
            ActionResponse::success(message, Some(submitted.note.id.to_string()))
        }
        Ok(Err(err)) => ActionResponse::failure(err.to_string()),
        Err(err) => ActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Flips the completion flag; unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle(note_id: String) -> ActionResponse {
    let id = NoteId::new(note_id.trim());
    match with_session(|session| session.app.toggle_completed(&id)) {
        Ok(true) => ActionResponse::success("Note updated.", Some(id.to_string())),
        Ok(false) => ActionResponse::success("Note not found.", None),
        Err(err) => ActionResponse::failure(format!("note_toggle failed: {err}")),
    }
}

/// Deletes a note; unknown ids are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(note_id: String) -> ActionResponse {
    let id = NoteId::new(note_id.trim());
    match with_session(|session| session.app.delete(&id)) {
        Ok(true) => ActionResponse::success("Note deleted.", Some(id.to_string())),
        Ok(false) => ActionResponse::success("Note not found.", None),
        Err(err) => ActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// Blocks until pending note writes reach storage.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_flush() -> ActionResponse {
    match with_session(|session| session.app.flush()) {
        Ok(Ok(())) => ActionResponse::success("Notes saved.", None),
        Ok(Err(err)) => ActionResponse::failure(format!("notes_flush failed: {err}")),
        Err(err) => ActionResponse::failure(format!("notes_flush failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn draft_get() -> Result<DraftItem, String> {
    with_session(|session| {
        let composer = session.app.composer();
        let draft = composer.draft();
        DraftItem {
            text: draft.text.clone(),
            category: draft.category.as_str().to_string(),
            priority: draft.priority.as_str().to_string(),
            reminder_at: draft.reminder_at.to_iso_string(),
            listening: composer.is_listening(),
        }
    })
}

/// Replaces the draft text; refused while dictation is active.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_set_text(text: String) -> ActionResponse {
    match with_session(|session| session.app.composer_mut().set_text(text)) {
        Ok(true) => ActionResponse::success("Draft updated.", None),
        Ok(false) => ActionResponse::failure("Draft is locked while listening."),
        Err(err) => ActionResponse::failure(format!("draft_set_text failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn draft_set_category(category: String) -> ActionResponse {
    let Some(category) = Category::parse(&category) else {
        return ActionResponse::failure(format!("unknown category `{category}`"));
    };
    match with_session(|session| session.app.composer_mut().set_category(category)) {
        Ok(()) => ActionResponse::success("Draft updated.", None),
        Err(err) => ActionResponse::failure(format!("draft_set_category failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn draft_set_priority(priority: String) -> ActionResponse {
    let Some(priority) = Priority::parse(&priority) else {
        return ActionResponse::failure(format!("unknown priority `{priority}`"));
    };
    match with_session(|session| session.app.composer_mut().set_priority(priority)) {
        Ok(()) => ActionResponse::success("Draft updated.", None),
        Err(err) => ActionResponse::failure(format!("draft_set_priority failed: {err}")),
    }
}

/// Sets the reminder instant picked in the date/time widget.
#[flutter_rust_bridge::frb(sync)]
pub fn draft_set_reminder(epoch_ms: i64) -> ActionResponse {
    let Some(reminder_at) = ReminderAt::from_epoch_millis(epoch_ms) else {
        return ActionResponse::failure(format!("reminder time out of range: {epoch_ms}"));
    };
    match with_session(|session| session.app.composer_mut().set_reminder_at(reminder_at)) {
        Ok(()) => ActionResponse::success("Draft updated.", None),
        Err(err) => ActionResponse::failure(format!("draft_set_reminder failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_open(kind: String) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |session, kind| session.app.overlay_mut(kind).open())
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_close(kind: String) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |session, kind| session.app.overlay_mut(kind).close())
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_toggle(kind: String) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |session, kind| session.app.overlay_mut(kind).toggle())
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_state(kind: String) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |_, _| ())
}

/// Offers a gesture move; `true` means the overlay took the gesture.
#[flutter_rust_bridge::frb(sync)]
pub fn overlay_drag_start(kind: String, dx: f64, dy: f64) -> bool {
    let mut taken = false;
    let result = with_overlay(&kind, |session, kind| {
        taken = session
            .app
            .overlay_mut(kind)
            .on_drag_start(DragDelta::new(dx, dy));
    });
    result.is_ok() && taken
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_drag_move(kind: String, dx: f64, dy: f64) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |session, kind| {
        session
            .app
            .overlay_mut(kind)
            .on_drag_move(DragDelta::new(dx, dy))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn overlay_drag_end(kind: String, dx: f64, dy: f64) -> Result<OverlayStateItem, String> {
    with_overlay(&kind, |session, kind| {
        session
            .app
            .overlay_mut(kind)
            .on_drag_end(DragDelta::new(dx, dy))
    })
}

/// Advances both overlays; call once per frame while either is animating.
#[flutter_rust_bridge::frb(sync)]
pub fn overlay_tick(elapsed_ms: u32) -> Vec<OverlayEventItem> {
    let elapsed = Duration::from_millis(u64::from(elapsed_ms));
    match with_session(|session| session.app.tick(elapsed)) {
        Ok(events) => events
            .into_iter()
            .map(|(kind, event)| OverlayEventItem {
                kind: kind.as_str().to_string(),
                event: match event {
                    MotionEvent::Opened => "opened",
                    MotionEvent::Closed => "closed",
                    MotionEvent::SettledOpen => "settled_open",
                }
                .to_string(),
            })
            .collect(),
        Err(err) => {
            warn!("event=overlay_tick module=ffi status=error error={}", err);
            Vec::new()
        }
    }
}

/// Starts dictation; the host begins speech capture when this succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn dictation_begin() -> ActionResponse {
    match with_session(|session| session.app.composer_mut().begin_dictation()) {
        Ok(Ok(())) => ActionResponse::success("Listening.", None),
        Ok(Err(err)) => ActionResponse::failure(err.to_string()),
        Err(err) => ActionResponse::failure(format!("dictation_begin failed: {err}")),
    }
}

/// Ends dictation with the host's recognition result.
///
/// A `failure` leaves the draft unchanged; a transcript replaces its text.
#[flutter_rust_bridge::frb(sync)]
pub fn dictation_end(transcript: Option<String>, failure: Option<String>) -> ActionResponse {
    let result = with_session(|session| {
        match failure {
            Some(message) => session.dictation.publish_failure(message),
            None => session.dictation.publish_transcript(transcript),
        }
        session.app.composer_mut().end_dictation()
    });
    match result {
        Ok(Ok(true)) => ActionResponse::success("Draft replaced with transcript.", None),
        Ok(Ok(false)) => ActionResponse::success("No speech recognized.", None),
        Ok(Err(err)) => ActionResponse::failure(err.to_string()),
        Err(err) => ActionResponse::failure(format!("dictation_end failed: {err}")),
    }
}

/// Publishes the platform notification permission (`granted|denied|undetermined`).
#[flutter_rust_bridge::frb(sync)]
pub fn notification_permission_set(status: String) -> ActionResponse {
    let Some(status) = PermissionStatus::parse(&status) else {
        return ActionResponse::failure(format!("unknown permission status `{status}`"));
    };
    match with_session(|session| {
        session.permissions.publish(status);
        session.app.reminders_mut().set_permission(status);
    }) {
        Ok(()) => ActionResponse::success("Permission recorded.", None),
        Err(err) => ActionResponse::failure(format!("notification_permission_set failed: {err}")),
    }
}

/// Drains reminders the host still has to schedule.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_take_pending() -> Vec<PendingReminderItem> {
    match with_session(|session| session.reminders.take_pending()) {
        Ok(pending) => pending.into_iter().map(to_pending_reminder_item).collect(),
        Err(err) => {
            warn!("event=reminders_drain module=ffi status=error error={}", err);
            Vec::new()
        }
    }
}

fn with_session<T>(f: impl FnOnce(&mut HostSession) -> T) -> Result<T, String> {
    let session = SESSION.get_or_init(|| Mutex::new(start_host_session()));
    let mut guard = session
        .lock()
        .map_err(|_| "session state poisoned".to_string())?;
    Ok(f(&mut guard))
}

fn with_overlay(
    kind: &str,
    f: impl FnOnce(&mut HostSession, OverlayKind),
) -> Result<OverlayStateItem, String> {
    let kind = OverlayKind::parse(kind).ok_or_else(|| format!("unknown overlay `{kind}`"))?;
    with_session(|session| {
        f(session, kind);
        let overlay = session.app.overlay(kind);
        OverlayStateItem {
            kind: kind.as_str().to_string(),
            phase: overlay.phase().as_str().to_string(),
            offset: overlay.offset(),
            visible: overlay.is_visible(),
        }
    })
}

fn start_host_session() -> HostSession {
    let config = CoreConfig::from_env();

    let storage: Box<dyn KeyValueStore> = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            error!(
                "event=session_storage module=ffi status=degraded mode=memory error={}",
                err
            );
            Box::new(MemoryKeyValueStore::new())
        }
    };

    let permissions = HostPermissions::new(PermissionStatus::Undetermined);
    let reminders = QueuedReminderScheduler::new();
    let dictation = HostTranscriptEngine::new();
    let app = AppSession::start(
        &config,
        SessionServices {
            storage,
            permissions: Box::new(permissions.clone()),
            scheduler: Box::new(reminders.clone()),
            dictation: Box::new(dictation.clone()),
            clock: Arc::new(SystemClock),
        },
    );

    HostSession {
        app,
        permissions,
        reminders,
        dictation,
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        text: note.text.clone(),
        created_date: note.created_date.clone(),
        created_time: note.created_time.clone(),
        category: note.category.as_str().to_string(),
        priority: note.priority.as_str().to_string(),
        reminder_at: note.reminder_at.to_iso_string(),
        completed: note.completed,
    }
}

fn to_pending_reminder_item(queued: QueuedReminder) -> PendingReminderItem {
    let QueuedReminder { handle, request } = queued;
    PendingReminderItem {
        handle: handle.to_string(),
        title: request.title,
        body: request.body,
        fire_at: request.fire_at.to_iso_string(),
        fire_at_epoch_ms: request.fire_at.epoch_millis(),
        show_alert: request.presentation.show_alert,
        play_sound: request.presentation.play_sound,
        set_badge: request.presentation.set_badge,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, draft_get, draft_set_category, draft_set_reminder, draft_set_text,
        init_logging, note_create, note_delete, note_toggle, notes_flush, notes_list,
        notification_permission_set, overlay_drag_end, overlay_drag_move, overlay_drag_start,
        overlay_open, overlay_state, overlay_tick, ping, reminders_take_pending,
    };
    use std::sync::{Mutex, MutexGuard};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Tests below share the process-wide session and its draft.
    static SESSION_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn session_guard() -> MutexGuard<'static, ()> {
        SESSION_TEST_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(error.contains("unsupported log level"), "{error}");
    }

    #[test]
    fn init_logging_blank_level_falls_back_to_configured_level() {
        // Relative dir keeps the process logger untouched; only the level check is observed.
        let error = init_logging("   ".to_string(), "tmp/logs".to_string());
        assert!(error.contains("invalid log directory"), "{error}");
    }

    #[test]
    fn create_toggle_delete_roundtrip_through_session() {
        let _guard = session_guard();
        let token = unique_token("ffi-note");
        assert!(draft_set_text(format!("  {token}  ")).ok);
        assert!(draft_set_category("work".to_string()).ok);
        assert!(!draft_set_category("hobby".to_string()).ok);

        let created = note_create();
        assert!(created.ok, "{}", created.message);
        let note_id = created.note_id.expect("created note should return id");
        assert!(draft_get().expect("draft").text.is_empty());

        let listed = notes_list(Some(token.to_uppercase()));
        let item = listed
            .items
            .iter()
            .find(|item| item.id == note_id)
            .expect("created note should be visible under its token");
        assert_eq!(item.text, token);
        assert_eq!(item.category, "work");
        assert!(!item.completed);

        assert!(note_toggle(note_id.clone()).ok);
        let listed = notes_list(None);
        assert!(listed.items.iter().any(|item| item.id == note_id && item.completed));

        assert!(note_delete(note_id.clone()).ok);
        let again = note_delete(note_id);
        assert!(again.ok);
        assert!(again.note_id.is_none());
        assert!(notes_flush().ok);
    }

    #[test]
    fn blank_draft_is_rejected_with_alert_text() {
        let _guard = session_guard();
        let response = with_blank_draft_create();
        assert!(!response.ok);
        assert_eq!(response.message, "Note cannot be empty!");
    }

    #[test]
    fn granted_permission_queues_future_reminders() {
        let _guard = session_guard();
        let token = unique_token("ffi-reminder");
        assert!(notification_permission_set("granted".to_string()).ok);
        let in_an_hour = now_ms() + 3_600_000;
        assert!(draft_set_reminder(in_an_hour).ok);
        assert!(draft_set_text(token.clone()).ok);

        let created = note_create();
        assert!(created.ok, "{}", created.message);

        let pending = reminders_take_pending();
        assert!(pending
            .iter()
            .any(|item| item.body == token && item.title == "Reminder"));
    }

    #[test]
    fn drawer_gesture_commits_past_threshold() {
        let _guard = session_guard();
        let opened = overlay_open("help_drawer".to_string()).expect("known overlay");
        assert!(opened.visible);
        overlay_tick(300);
        assert_eq!(
            overlay_state("help_drawer".to_string()).expect("state").phase,
            "open"
        );

        assert!(overlay_drag_start("help_drawer".to_string(), 12.0, 0.0));
        overlay_drag_move("help_drawer".to_string(), 151.0, 0.0).expect("move");
        let released = overlay_drag_end("help_drawer".to_string(), 151.0, 0.0).expect("end");
        assert_eq!(released.phase, "closing");

        let events = overlay_tick(300);
        assert!(events
            .iter()
            .any(|item| item.kind == "help_drawer" && item.event == "closed"));
        assert!(!overlay_state("drawer".to_string()).expect("state").visible);
        assert!(overlay_state("sidebar".to_string()).is_err());
    }

    fn with_blank_draft_create() -> super::ActionResponse {
        assert!(draft_set_text("   ".to_string()).ok);
        note_create()
    }

    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .expect("system time should be after unix epoch")
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}

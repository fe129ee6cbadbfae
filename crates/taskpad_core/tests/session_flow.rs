use std::sync::Arc;
use std::time::Duration;
use taskpad_core::{
    AppSession, Category, CoreConfig, DictationError, HostPermissions, HostTranscriptEngine,
    ManualClock, MemoryKeyValueStore, MotionEvent, OverlayKind, OverlayPhase, PermissionStatus,
    Priority, QueuedReminderScheduler, ReminderAt, ReminderOutcome, SessionServices,
};

const T0: i64 = 1_760_779_800_000;

struct Harness {
    session: AppSession,
    storage: MemoryKeyValueStore,
    permissions: HostPermissions,
    reminders: QueuedReminderScheduler,
    dictation: HostTranscriptEngine,
    clock: Arc<ManualClock>,
}

fn start(permission: PermissionStatus) -> Harness {
    start_with_storage(permission, MemoryKeyValueStore::new())
}

fn start_with_storage(permission: PermissionStatus, storage: MemoryKeyValueStore) -> Harness {
    let permissions = HostPermissions::new(permission);
    let reminders = QueuedReminderScheduler::new();
    let dictation = HostTranscriptEngine::new();
    let clock = Arc::new(ManualClock::at_epoch_millis(T0));
    let session = AppSession::start(
        &CoreConfig::default(),
        SessionServices {
            storage: Box::new(storage.clone()),
            permissions: Box::new(permissions.clone()),
            scheduler: Box::new(reminders.clone()),
            dictation: Box::new(dictation.clone()),
            clock: clock.clone(),
        },
    );
    Harness {
        session,
        storage,
        permissions,
        reminders,
        dictation,
        clock,
    }
}

fn in_one_hour() -> ReminderAt {
    ReminderAt::from_epoch_millis(T0 + 3_600_000).unwrap()
}

#[test]
fn startup_resolves_permission_and_seeds_draft() {
    let harness = start(PermissionStatus::Granted);
    assert_eq!(
        harness.session.reminders().permission(),
        Some(PermissionStatus::Granted)
    );

    let draft = harness.session.composer().draft();
    assert!(draft.text.is_empty());
    assert_eq!(draft.category, Category::Personal);
    assert_eq!(draft.priority, Priority::Normal);
    assert_eq!(draft.reminder_at.epoch_millis(), T0);
    assert!(harness.session.notes().is_empty());
}

#[test]
fn submit_schedules_future_reminder_and_closes_sheet() {
    let mut harness = start(PermissionStatus::Granted);
    let composer = harness.session.composer_mut();
    composer.open();
    assert!(composer.set_text("  Buy milk "));
    composer.set_category(Category::Work);
    composer.set_priority(Priority::High);
    composer.set_reminder_at(in_one_hour());
    harness.session.tick(Duration::from_millis(300));

    let submitted = harness.session.submit_note().unwrap();
    assert_eq!(submitted.note.text, "Buy milk");
    assert!(matches!(submitted.reminder, ReminderOutcome::Scheduled(_)));

    let pending = harness.reminders.take_pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].request.title, "Reminder");
    assert_eq!(pending[0].request.body, "Buy milk");
    assert_eq!(pending[0].request.fire_at, in_one_hour());
    assert!(pending[0].request.presentation.show_alert);
    assert!(!pending[0].request.presentation.set_badge);

    let draft = harness.session.composer().draft();
    assert!(draft.text.is_empty());
    assert_eq!(draft.category, Category::Work);
    assert_eq!(draft.priority, Priority::High);
    assert_eq!(
        harness.session.overlay(OverlayKind::CreationSheet).phase(),
        OverlayPhase::Closing
    );
}

#[test]
fn denied_permission_still_saves_note() {
    let mut harness = start(PermissionStatus::Denied);
    harness.session.composer_mut().set_text("no alerts");
    harness.session.composer_mut().set_reminder_at(in_one_hour());

    let submitted = harness.session.submit_note().unwrap();
    assert_eq!(submitted.reminder, ReminderOutcome::SkippedPermission);
    assert!(harness.reminders.take_pending().is_empty());
    harness.session.flush().unwrap();

    let reopened = start_with_storage(PermissionStatus::Denied, harness.storage.clone());
    assert_eq!(reopened.session.notes().len(), 1);
    assert_eq!(reopened.session.notes()[0].text, "no alerts");
}

#[test]
fn permission_granted_later_enables_scheduling() {
    let mut harness = start(PermissionStatus::Undetermined);
    assert_eq!(
        harness.session.reminders().permission(),
        Some(PermissionStatus::Undetermined)
    );

    harness.permissions.publish(PermissionStatus::Granted);
    harness
        .session
        .reminders_mut()
        .set_permission(PermissionStatus::Granted);
    harness.session.composer_mut().set_text("later");
    harness.session.composer_mut().set_reminder_at(in_one_hour());

    let submitted = harness.session.submit_note().unwrap();
    assert!(matches!(submitted.reminder, ReminderOutcome::Scheduled(_)));
}

#[test]
fn past_due_reminder_is_skipped() {
    let mut harness = start(PermissionStatus::Granted);
    harness.clock.advance_millis(60_000);
    harness.session.composer_mut().set_text("stale reminder");

    let submitted = harness.session.submit_note().unwrap();
    assert_eq!(submitted.reminder, ReminderOutcome::SkippedPastDue);
    assert!(harness.reminders.take_pending().is_empty());
    assert_eq!(harness.session.notes().len(), 1);
}

#[test]
fn blank_submit_changes_nothing() {
    let mut harness = start(PermissionStatus::Granted);
    let composer = harness.session.composer_mut();
    composer.open();
    composer.set_text("   ");
    harness.session.tick(Duration::from_millis(300));

    let err = harness.session.submit_note().unwrap_err();
    assert_eq!(err.to_string(), "Note cannot be empty!");
    assert!(harness.session.notes().is_empty());
    assert_eq!(harness.session.composer().draft().text, "   ");
    assert_eq!(
        harness.session.overlay(OverlayKind::CreationSheet).phase(),
        OverlayPhase::Open
    );
}

#[test]
fn dictation_replaces_draft_text_verbatim() {
    let mut harness = start(PermissionStatus::Granted);
    let composer = harness.session.composer_mut();
    assert!(composer.set_text("typed text"));

    composer.begin_dictation().unwrap();
    assert!(composer.is_listening());
    assert!(harness.dictation.is_capturing());
    assert_eq!(harness.dictation.requested_locale().as_deref(), Some("en-US"));
    assert!(!composer.set_text("ignored while listening"));
    assert_eq!(
        composer.begin_dictation().unwrap_err(),
        DictationError::AlreadyActive
    );

    harness
        .dictation
        .publish_transcript(Some("Call mom at noon".to_string()));
    assert!(composer.end_dictation().unwrap());
    assert!(!composer.is_listening());
    assert_eq!(composer.draft().text, "Call mom at noon");
}

#[test]
fn dictation_failure_leaves_draft_unchanged() {
    let mut harness = start(PermissionStatus::Granted);
    let composer = harness.session.composer_mut();
    composer.set_text("keep this");
    composer.begin_dictation().unwrap();

    harness.dictation.publish_failure("no microphone");
    let err = composer.end_dictation().unwrap_err();
    assert!(matches!(err, DictationError::Engine(_)));
    assert!(!composer.is_listening());
    assert_eq!(composer.draft().text, "keep this");

    assert_eq!(
        composer.end_dictation().unwrap_err(),
        DictationError::NotActive
    );
}

#[test]
fn overlays_open_independently() {
    let mut harness = start(PermissionStatus::Granted);
    harness.session.overlay_mut(OverlayKind::HelpDrawer).open();
    harness.session.composer_mut().open();

    let events = harness.session.tick(Duration::from_millis(300));
    assert_eq!(
        events,
        vec![
            (OverlayKind::HelpDrawer, MotionEvent::Opened),
            (OverlayKind::CreationSheet, MotionEvent::Opened),
        ]
    );
    assert!(harness.session.overlay(OverlayKind::HelpDrawer).is_visible());
    assert!(harness.session.overlay(OverlayKind::CreationSheet).is_visible());

    harness.session.overlay_mut(OverlayKind::HelpDrawer).close();
    harness.session.tick(Duration::from_millis(300));
    assert!(!harness.session.overlay(OverlayKind::HelpDrawer).is_visible());
    assert!(harness.session.overlay(OverlayKind::CreationSheet).is_visible());
}

#[test]
fn visible_notes_follow_search_query_and_mutations() {
    let mut harness = start(PermissionStatus::Granted);
    for text in ["Buy milk", "Walk dog", "Milk the cow"] {
        harness.session.composer_mut().set_text(text);
        harness.session.submit_note().unwrap();
    }

    harness.session.set_search_query("MILK");
    let visible: Vec<String> = harness
        .session
        .visible_notes()
        .iter()
        .map(|note| note.text.clone())
        .collect();
    assert_eq!(visible, vec!["Buy milk", "Milk the cow"]);

    let first = harness.session.visible_notes()[0].id.clone();
    assert!(harness.session.toggle_completed(&first));
    assert!(harness.session.delete(&first));
    assert_eq!(harness.session.visible_notes().len(), 1);
    assert_eq!(harness.session.notes().len(), 2);

    harness.session.set_search_query("");
    assert_eq!(harness.session.visible_notes().len(), 2);
}

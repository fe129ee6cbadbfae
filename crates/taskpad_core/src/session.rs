//! App session: the explicit state a notes screen runs on.
//!
//! # Responsibility
//! - Wire the note store, reminder bridge and both overlays together.
//! - Run the startup sequence (load notes, resolve notification permission).
//!
//! # Invariants
//! - Overlays are independent; opening one never closes the other.
//! - The visible list is recomputed from the full collection on every read.

use crate::compose::{NoteComposer, SubmittedNote};
use crate::config::CoreConfig;
use crate::dictation::{DictationEngine, DictationSession};
use crate::model::draft::NoteDraft;
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::model::timestamp::ReminderAt;
use crate::overlay::{MotionEvent, OverlayController, OverlayKind};
use crate::reminder::{NotificationPermissions, ReminderBridge, ReminderScheduler};
use crate::repo::kv_store::{KeyValueStore, StorageResult};
use crate::search::filter::filter_notes;
use crate::service::clock::Clock;
use crate::service::note_store::NoteStore;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Platform collaborators a session is started with.
pub struct SessionServices {
    pub storage: Box<dyn KeyValueStore>,
    pub permissions: Box<dyn NotificationPermissions>,
    pub scheduler: Box<dyn ReminderScheduler>,
    pub dictation: Box<dyn DictationEngine>,
    pub clock: Arc<dyn Clock>,
}

pub struct AppSession {
    store: NoteStore,
    reminders: ReminderBridge,
    drawer: OverlayController,
    composer: NoteComposer,
    search_query: String,
}

impl AppSession {
    /// Loads notes and asks for notification permission once.
    pub fn start(config: &CoreConfig, services: SessionServices) -> Self {
        let started_at = Instant::now();
        let SessionServices {
            storage,
            permissions,
            scheduler,
            dictation,
            clock,
        } = services;

        let store =
            NoteStore::open_with_clock(storage, config.storage_key.clone(), Arc::clone(&clock));
        let mut reminders = ReminderBridge::new(permissions, scheduler, Arc::clone(&clock));
        let permission = reminders.ensure_permission();

        let draft = NoteDraft::new(ReminderAt::new(clock.now().with_timezone(&Utc)));
        let composer = NoteComposer::new(
            draft,
            DictationSession::new(dictation, config.dictation_locale.clone()),
            config.motion,
        );

        info!(
            "event=session_start module=session status=ok notes={} permission={} duration_ms={}",
            store.len(),
            permission.as_str(),
            started_at.elapsed().as_millis()
        );

        Self {
            store,
            reminders,
            drawer: OverlayController::with_config(OverlayKind::HelpDrawer, config.motion),
            composer,
            search_query: String::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.store.all()
    }

    /// Notes matching the current search query, in collection order.
    pub fn visible_notes(&self) -> Vec<&Note> {
        filter_notes(self.store.all(), &self.search_query)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn toggle_completed(&mut self, id: &NoteId) -> bool {
        self.store.toggle_completed(id)
    }

    pub fn delete(&mut self, id: &NoteId) -> bool {
        self.store.delete(id)
    }

    /// Commits the creation draft; see [`NoteComposer::submit`].
    pub fn submit_note(&mut self) -> Result<SubmittedNote, NoteValidationError> {
        self.composer.submit(&mut self.store, &mut self.reminders)
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn reminders(&self) -> &ReminderBridge {
        &self.reminders
    }

    pub fn reminders_mut(&mut self) -> &mut ReminderBridge {
        &mut self.reminders
    }

    pub fn composer(&self) -> &NoteComposer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut NoteComposer {
        &mut self.composer
    }

    pub fn overlay(&self, kind: OverlayKind) -> &OverlayController {
        match kind {
            OverlayKind::HelpDrawer => &self.drawer,
            OverlayKind::CreationSheet => self.composer.sheet(),
        }
    }

    pub fn overlay_mut(&mut self, kind: OverlayKind) -> &mut OverlayController {
        match kind {
            OverlayKind::HelpDrawer => &mut self.drawer,
            OverlayKind::CreationSheet => self.composer.sheet_mut(),
        }
    }

    /// Advances both overlays by one scheduler tick.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<(OverlayKind, MotionEvent)> {
        [OverlayKind::HelpDrawer, OverlayKind::CreationSheet]
            .into_iter()
            .filter_map(|kind| {
                self.overlay_mut(kind)
                    .tick(elapsed)
                    .map(|event| (kind, event))
            })
            .collect()
    }

    /// Waits for pending note writes to reach storage.
    pub fn flush(&self) -> StorageResult<()> {
        self.store.flush()
    }
}

//! Note-creation flow.
//!
//! # Responsibility
//! - Own the creation sheet's overlay, draft record and dictation state.
//! - Commit a draft through the note store, then hand it to reminders.
//!
//! # Invariants
//! - A rejected submit leaves the store, draft and sheet untouched.
//! - While dictation is active, programmatic text writes are refused.
//! - A transcript replaces the draft text verbatim; failures leave it as is.

use crate::dictation::{DictationError, DictationSession};
use crate::model::draft::NoteDraft;
use crate::model::note::{Category, Note, NoteValidationError, Priority};
use crate::model::timestamp::ReminderAt;
use crate::overlay::{MotionConfig, OverlayController, OverlayKind};
use crate::reminder::{ReminderBridge, ReminderOutcome};
use crate::service::note_store::NoteStore;
use log::{info, warn};

/// A committed note together with what happened to its reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedNote {
    pub note: Note,
    pub reminder: ReminderOutcome,
}

pub struct NoteComposer {
    sheet: OverlayController,
    draft: NoteDraft,
    dictation: DictationSession,
}

impl NoteComposer {
    pub fn new(draft: NoteDraft, dictation: DictationSession, motion: MotionConfig) -> Self {
        Self {
            sheet: OverlayController::with_config(OverlayKind::CreationSheet, motion),
            draft,
            dictation,
        }
    }

    pub fn sheet(&self) -> &OverlayController {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut OverlayController {
        &mut self.sheet
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    pub fn open(&mut self) {
        self.sheet.open();
    }

    pub fn close(&mut self) {
        self.sheet.close();
    }

    pub fn is_listening(&self) -> bool {
        self.dictation.is_active()
    }

    /// Replaces the draft text.
    ///
    /// Returns `false` without writing while dictation owns the field.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        if self.dictation.is_active() {
            warn!("event=draft_text module=compose status=skip reason=dictation_active");
            return false;
        }
        self.draft.text = text.into();
        true
    }

    pub fn set_category(&mut self, category: Category) {
        self.draft.category = category;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.draft.priority = priority;
    }

    pub fn set_reminder_at(&mut self, reminder_at: ReminderAt) {
        self.draft.reminder_at = reminder_at;
    }

    pub fn begin_dictation(&mut self) -> Result<(), DictationError> {
        self.dictation.begin()
    }

    /// Stops dictation and applies the transcript, if any.
    ///
    /// Returns whether the draft text was replaced.
    pub fn end_dictation(&mut self) -> Result<bool, DictationError> {
        match self.dictation.end()? {
            Some(transcript) => {
                self.draft.text = transcript;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Commits the draft as a new note.
    ///
    /// On success the draft text is cleared, the sheet starts closing and
    /// the reminder is scheduled. On failure nothing changes and the error
    /// is meant for a blocking alert.
    pub fn submit(
        &mut self,
        store: &mut NoteStore,
        reminders: &mut ReminderBridge,
    ) -> Result<SubmittedNote, NoteValidationError> {
        let note = store.create_from_draft(&self.draft)?;
        self.draft.clear_text();
        self.sheet.close();
        let reminder = reminders.schedule_for(&note);
        info!(
            "event=note_submit module=compose status=ok note_id={} reminder={:?}",
            note.id, reminder
        );
        Ok(SubmittedNote { note, reminder })
    }
}

//! Note-creation draft record.
//!
//! The creation sheet edits one explicit draft instead of scattered UI flags.
//! A successful submit clears only `text`; the other choices carry over to
//! the next note.

use crate::model::note::{Category, Priority};
use crate::model::timestamp::ReminderAt;

/// Editable state of the note-creation sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub reminder_at: ReminderAt,
}

impl NoteDraft {
    /// Creates an empty draft with default category/priority.
    pub fn new(reminder_at: ReminderAt) -> Self {
        Self {
            text: String::new(),
            category: Category::default(),
            priority: Priority::default(),
            reminder_at,
        }
    }

    /// Resets the text field after a successful submit.
    pub fn clear_text(&mut self) {
        self.text.clear();
    }
}

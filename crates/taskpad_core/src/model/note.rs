//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its fixed category/priority sets.
//! - Validate note state before it enters the in-memory collection.
//!
//! # Invariants
//! - `id` is stable and unique within a collection.
//! - `text` is non-empty after trimming.
//! - `created_date`/`created_time` are captured once and never recomputed.

use crate::model::timestamp::ReminderAt;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a note.
///
/// Derived from the creation instant in epoch milliseconds, kept as an
/// opaque string so persisted ids from any writer stay valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the id used for a note created at `epoch_ms`.
    pub fn from_epoch_millis(epoch_ms: i64) -> Self {
        Self(epoch_ms.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric view of ids generated by this crate.
    ///
    /// Returns `None` for foreign ids that are not plain integers.
    pub fn epoch_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fixed note category set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Personal,
    Work,
    School,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Personal, Self::Work, Self::School];

    /// Stable string id used on the wire and across FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::School => "school",
        }
    }

    /// Parses a case-insensitive category id.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "personal" => Some(Self::Personal),
            "work" => Some(Self::Work),
            "school" => Some(Self::School),
            _ => None,
        }
    }
}

/// Fixed note priority set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Normal, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Validation failures for note state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Note text is empty after trimming.
    EmptyText,
    /// Note id is blank.
    EmptyId,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "Note cannot be empty!"),
            Self::EmptyId => write!(f, "note id cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Persisted note record.
///
/// Field names follow the camelCase blob schema. The aliases accept records
/// written before `createdDate`/`createdTime`/`reminderAt` were introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(alias = "date")]
    pub created_date: String,
    #[serde(alias = "time")]
    pub created_time: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(alias = "reminderDate")]
    pub reminder_at: ReminderAt,
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Validates the note invariants that must hold inside a collection.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(NoteValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(NoteValidationError::EmptyText);
        }
        Ok(())
    }

    /// Flips the completion flag, the only mutation a note supports.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Trims note text and rejects blank input.
pub fn normalize_note_text(raw: &str) -> Result<String, NoteValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NoteValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_note_text, Category, Note, NoteId, NoteValidationError, Priority};

    fn sample_note() -> Note {
        Note {
            id: NoteId::from_epoch_millis(1_760_779_800_000),
            text: "Buy milk".to_string(),
            created_date: "10/18/2026".to_string(),
            created_time: "09:30 AM".to_string(),
            category: Category::Personal,
            priority: Priority::Normal,
            reminder_at: "2026-10-19T08:00:00.000Z".parse().expect("valid timestamp"),
            completed: false,
        }
    }

    #[test]
    fn category_and_priority_parse_case_insensitively() {
        assert_eq!(Category::parse(" Work "), Some(Category::Work));
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Category::parse("hobby"), None);
    }

    #[test]
    fn normalize_note_text_trims_and_rejects_blank() {
        assert_eq!(normalize_note_text("  hi \n").expect("non-blank"), "hi");
        assert_eq!(
            normalize_note_text(" \t ").expect_err("blank must fail"),
            NoteValidationError::EmptyText
        );
    }

    #[test]
    fn validate_rejects_blank_text_and_id() {
        let mut note = sample_note();
        assert!(note.validate().is_ok());

        note.text = "   ".to_string();
        assert_eq!(note.validate(), Err(NoteValidationError::EmptyText));

        let mut note = sample_note();
        note.id = NoteId::new("");
        assert_eq!(note.validate(), Err(NoteValidationError::EmptyId));
    }

    #[test]
    fn serializes_with_camel_case_schema() {
        let value = serde_json::to_value(sample_note()).expect("serialize note");
        assert_eq!(value["id"], "1760779800000");
        assert_eq!(value["createdDate"], "10/18/2026");
        assert_eq!(value["createdTime"], "09:30 AM");
        assert_eq!(value["category"], "personal");
        assert_eq!(value["priority"], "normal");
        assert_eq!(value["reminderAt"], "2026-10-19T08:00:00.000Z");
        assert_eq!(value["completed"], false);
    }

    #[test]
    fn toggle_completed_flips_flag() {
        let mut note = sample_note();
        note.toggle_completed();
        assert!(note.completed);
        note.toggle_completed();
        assert!(!note.completed);
    }
}

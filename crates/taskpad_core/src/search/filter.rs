//! In-memory note search.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test on note text only.
//! - Output preserves input order; an empty query keeps every note.
//! - Filtering is pure and cheap enough to run on every keystroke.

use crate::model::note::{Category, Note, Priority};

/// Returns notes whose text contains `query`, ignoring case.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| text_matches(note, &needle))
        .collect()
}

/// Search options layered on top of the text query.
///
/// Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub query: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl NoteFilter {
    /// Text-only filter, equivalent to [`filter_notes`].
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        let needle = self.query.to_lowercase();
        notes
            .iter()
            .filter(|note| text_matches(note, &needle))
            .filter(|note| self.category.map_or(true, |category| note.category == category))
            .filter(|note| self.priority.map_or(true, |priority| note.priority == priority))
            .filter(|note| self.completed.map_or(true, |completed| note.completed == completed))
            .collect()
    }
}

fn text_matches(note: &Note, lowered_query: &str) -> bool {
    lowered_query.is_empty() || note.text.to_lowercase().contains(lowered_query)
}

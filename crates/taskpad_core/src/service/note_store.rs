//! Note store use-case service.
//!
//! # Responsibility
//! - Own the in-memory note collection and its invariants.
//! - Provide create/toggle/delete/query entry points for UI callers.
//! - Hand a full snapshot to the background writer after every mutation.
//!
//! # Invariants
//! - Ids are unique and strictly increasing for notes created by this store.
//! - Insertion order is preserved; deletes never reorder survivors.
//! - Persistence failures never roll back the in-memory collection.

use crate::model::draft::NoteDraft;
use crate::model::note::{
    normalize_note_text, Category, Note, NoteId, NoteValidationError, Priority,
};
use crate::model::timestamp::ReminderAt;
use crate::repo::kv_store::{KeyValueStore, StorageResult};
use crate::repo::note_snapshot::{encode_notes, load_notes};
use crate::service::clock::{Clock, SystemClock};
use crate::service::snapshot_writer::{SharedStore, SnapshotWriter};
use chrono::{DateTime, FixedOffset};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};

const CREATED_DATE_FORMAT: &str = "%-m/%-d/%Y";
const CREATED_TIME_FORMAT: &str = "%I:%M %p";

/// In-memory note collection synchronized to a key-value store.
pub struct NoteStore {
    notes: Vec<Note>,
    store: SharedStore,
    writer: SnapshotWriter,
    clock: Arc<dyn Clock>,
    last_issued_ms: i64,
}

impl NoteStore {
    /// Opens the store using the device clock.
    pub fn open(store: impl KeyValueStore + 'static, storage_key: impl Into<String>) -> Self {
        Self::open_with_clock(store, storage_key, Arc::new(SystemClock))
    }

    /// Opens the store, loading any existing collection fail-soft.
    pub fn open_with_clock(
        store: impl KeyValueStore + 'static,
        storage_key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(Box::new(store)));
        let writer = SnapshotWriter::spawn(Arc::clone(&store), storage_key);
        let mut note_store = Self {
            notes: Vec::new(),
            store,
            writer,
            clock,
            last_issued_ms: 0,
        };
        note_store.load();
        note_store
    }

    /// Re-reads the durable collection, replacing the in-memory one.
    ///
    /// Pending writes are flushed first so the read never observes a
    /// snapshot older than memory. Read failures degrade to empty.
    pub fn load(&mut self) -> &[Note] {
        if let Err(err) = self.writer.flush() {
            warn!(
                "event=notes_load module=service status=degraded stage=flush error={}",
                err
            );
        }

        self.notes = match self.store.lock() {
            Ok(store) => load_notes(&**store, self.writer.key()),
            Err(_) => {
                error!("event=notes_load module=service status=error error=store_lock_poisoned");
                Vec::new()
            }
        };
        self.last_issued_ms = self
            .notes
            .iter()
            .filter_map(|note| note.id.epoch_millis())
            .max()
            .unwrap_or(0)
            .max(self.last_issued_ms);
        &self.notes
    }

    /// Creates and appends one note.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank after trimming; nothing changes.
    pub fn create(
        &mut self,
        text: &str,
        category: Category,
        priority: Priority,
        reminder_at: ReminderAt,
    ) -> Result<Note, NoteValidationError> {
        let text = match normalize_note_text(text) {
            Ok(text) => text,
            Err(err) => {
                info!("event=note_create module=service status=rejected error_code=empty_text");
                return Err(err);
            }
        };

        let now = self.clock.now();
        let note = Note {
            id: self.next_id(&now),
            text,
            created_date: now.format(CREATED_DATE_FORMAT).to_string(),
            created_time: now.format(CREATED_TIME_FORMAT).to_string(),
            category,
            priority,
            reminder_at,
            completed: false,
        };

        self.notes.push(note.clone());
        info!(
            "event=note_create module=service status=ok note_id={} text_len={} category={} priority={}",
            note.id,
            note.text.chars().count(),
            note.category.as_str(),
            note.priority.as_str()
        );
        self.persist();
        Ok(note)
    }

    /// Creates a note from the creation-sheet draft.
    pub fn create_from_draft(&mut self, draft: &NoteDraft) -> Result<Note, NoteValidationError> {
        self.create(&draft.text, draft.category, draft.priority, draft.reminder_at.clone())
    }

    /// Flips `completed` on the matching note.
    ///
    /// Returns `false` (and persists nothing) when `id` is unknown.
    pub fn toggle_completed(&mut self, id: &NoteId) -> bool {
        let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) else {
            info!(
                "event=note_toggle module=service status=skip note_id={} reason=not_found",
                id
            );
            return false;
        };

        note.toggle_completed();
        info!(
            "event=note_toggle module=service status=ok note_id={} completed={}",
            id, note.completed
        );
        self.persist();
        true
    }

    /// Removes the matching note.
    ///
    /// Returns `false` (and persists nothing) when `id` is unknown.
    pub fn delete(&mut self, id: &NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        if self.notes.len() == before {
            info!(
                "event=note_delete module=service status=skip note_id={} reason=not_found",
                id
            );
            return false;
        }

        info!("event=note_delete module=service status=ok note_id={}", id);
        self.persist();
        true
    }

    /// Current collection in insertion order.
    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn storage_key(&self) -> &str {
        self.writer.key()
    }

    /// Waits for the newest snapshot to reach storage.
    pub fn flush(&self) -> StorageResult<()> {
        self.writer.flush()
    }

    fn persist(&mut self) {
        match encode_notes(&self.notes) {
            Ok(blob) => self.writer.submit(blob),
            Err(err) => error!(
                "event=snapshot_write module=service status=error stage=encode error={}",
                err
            ),
        }
    }

    fn next_id(&mut self, now: &DateTime<FixedOffset>) -> NoteId {
        let mut candidate = now.timestamp_millis().max(self.last_issued_ms + 1);
        loop {
            let id = NoteId::from_epoch_millis(candidate);
            if self.get(&id).is_none() {
                self.last_issued_ms = candidate;
                return id;
            }
            candidate += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::model::note::{Category, Priority};
    use crate::model::timestamp::ReminderAt;
    use crate::repo::kv_store::MemoryKeyValueStore;
    use crate::service::clock::ManualClock;
    use std::sync::Arc;

    fn reminder() -> ReminderAt {
        ReminderAt::from_epoch_millis(1_760_800_000_000).expect("in range")
    }

    #[test]
    fn same_millisecond_creates_get_distinct_ids() {
        let clock = Arc::new(ManualClock::at_epoch_millis(1_760_779_800_000));
        let mut store =
            NoteStore::open_with_clock(MemoryKeyValueStore::new(), "notes", clock.clone());

        let first = store
            .create("a", Category::Work, Priority::Low, reminder())
            .expect("create a");
        let second = store
            .create("b", Category::Work, Priority::Low, reminder())
            .expect("create b");

        assert_eq!(first.id.as_str(), "1760779800000");
        assert_eq!(second.id.as_str(), "1760779800001");
    }

    #[test]
    fn created_stamps_use_display_format() {
        let clock = Arc::new(ManualClock::at_epoch_millis(1_760_779_800_000));
        let mut store = NoteStore::open_with_clock(MemoryKeyValueStore::new(), "notes", clock);

        let note = store
            .create("  stamp me  ", Category::School, Priority::High, reminder())
            .expect("create");

        assert_eq!(note.text, "stamp me");
        assert_eq!(note.created_date, "10/18/2025");
        assert_eq!(note.created_time, "09:30 AM");
    }
}

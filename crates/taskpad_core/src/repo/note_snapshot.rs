//! Full-collection snapshot codec for notes.
//!
//! # Responsibility
//! - Encode/decode the whole note collection as one JSON array blob.
//! - Load the collection from a `KeyValueStore` with fail-soft semantics.
//!
//! # Invariants
//! - A decoded collection never contains invalid notes or duplicate ids.
//! - Load failures never propagate to startup; they degrade to empty.

use crate::model::note::{Note, NoteId};
use crate::repo::kv_store::{KeyValueStore, StorageError};
use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Snapshot read/write failure.
#[derive(Debug)]
pub enum SnapshotError {
    Storage(StorageError),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "invalid note snapshot: {err}"),
            Self::Encode(err) => write!(f, "failed to encode note snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for SnapshotError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Serializes the collection in its current order.
pub fn encode_notes(notes: &[Note]) -> Result<String, SnapshotError> {
    serde_json::to_string(notes).map_err(SnapshotError::Encode)
}

/// Parses a snapshot blob, dropping records that break collection invariants.
///
/// Each record is decoded on its own, so one malformed record never hides
/// the rest. The first occurrence of a duplicated id wins.
///
/// # Errors
/// - `Decode` only when the blob itself is not a JSON array.
pub fn decode_notes(blob: &str) -> Result<Vec<Note>, SnapshotError> {
    let records: Vec<Value> = serde_json::from_str(blob).map_err(SnapshotError::Decode)?;
    let mut seen: HashSet<NoteId> = HashSet::with_capacity(records.len());
    let mut notes = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let record_id = record_id(&record);
        let note = match serde_json::from_value::<Note>(record) {
            Ok(note) => note,
            Err(err) => {
                warn!(
                    "event=snapshot_decode module=repo status=skip index={} note_id={} reason=malformed error={}",
                    index, record_id, err
                );
                continue;
            }
        };
        if let Err(err) = note.validate() {
            warn!(
                "event=snapshot_decode module=repo status=skip index={} note_id={} reason={}",
                index, note.id, err
            );
            continue;
        }
        if !seen.insert(note.id.clone()) {
            warn!(
                "event=snapshot_decode module=repo status=skip index={} note_id={} reason=duplicate_id",
                index, note.id
            );
            continue;
        }
        notes.push(note);
    }

    Ok(notes)
}

fn record_id(record: &Value) -> String {
    match record.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

/// Reads and decodes the collection stored under `key`.
///
/// Returns `Ok(empty)` when nothing has been stored yet.
pub fn try_load_notes(store: &dyn KeyValueStore, key: &str) -> Result<Vec<Note>, SnapshotError> {
    match store.get(key)? {
        Some(blob) => decode_notes(&blob),
        None => Ok(Vec::new()),
    }
}

/// Fail-soft variant of [`try_load_notes`] used on startup.
pub fn load_notes(store: &dyn KeyValueStore, key: &str) -> Vec<Note> {
    match try_load_notes(store, key) {
        Ok(notes) => {
            info!(
                "event=notes_load module=repo status=ok key={} count={}",
                key,
                notes.len()
            );
            notes
        }
        Err(err) => {
            error!(
                "event=notes_load module=repo status=error key={} error={}",
                key, err
            );
            Vec::new()
        }
    }
}

/// Writes the full collection under `key` synchronously.
pub fn save_notes(
    store: &mut dyn KeyValueStore,
    key: &str,
    notes: &[Note],
) -> Result<(), SnapshotError> {
    let blob = encode_notes(notes)?;
    store.set(key, &blob)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_notes, load_notes};
    use crate::repo::kv_store::MemoryKeyValueStore;

    const LEGACY_BLOB: &str = r#"[
        {"id":"1","text":"first","date":"1/2/2024","time":"10:00 AM","category":"work","priority":"high","reminderDate":"2024-01-02T10:00:00.000Z","completed":true},
        {"id":"1","text":"dup","date":"1/2/2024","time":"10:00 AM","category":"work","priority":"high","reminderDate":"2024-01-02T10:00:00.000Z","completed":false},
        {"id":"2","text":"   ","date":"1/2/2024","time":"10:00 AM","category":"school","priority":"low","reminderDate":"2024-01-02T10:00:00.000Z","completed":false}
    ]"#;

    #[test]
    fn decode_accepts_legacy_field_names_and_drops_invalid_rows() {
        let notes = decode_notes(LEGACY_BLOB).expect("legacy blob should decode");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "first");
        assert_eq!(notes[0].created_date, "1/2/2024");
        assert!(notes[0].completed);
    }

    #[test]
    fn malformed_record_is_dropped_alone() {
        let blob = r#"[
            {"id":"10","text":"keep me","createdDate":"1/2/2024","createdTime":"10:00 AM","category":"work","priority":"high","reminderAt":"2024-01-02T10:00:00.000Z","completed":false},
            {"id":"11","text":"bad category","createdDate":"1/2/2024","createdTime":"10:00 AM","category":"hobby","priority":"high","reminderAt":"2024-01-02T10:00:00.000Z","completed":false},
            {"id":"12","text":"bad time","createdDate":"1/2/2024","createdTime":"10:00 AM","category":"work","priority":"low","reminderAt":"next tuesday","completed":false},
            42
        ]"#;
        let notes = decode_notes(blob).expect("array blob should decode");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "keep me");
    }

    #[test]
    fn load_degrades_to_empty_on_corrupt_blob() {
        let store = MemoryKeyValueStore::with_entry("notes", "{not json");
        assert!(load_notes(&store, "notes").is_empty());
    }

    #[test]
    fn load_of_missing_key_is_empty() {
        let store = MemoryKeyValueStore::new();
        assert!(load_notes(&store, "notes").is_empty());
    }
}

//! Domain model for notes and the note-creation draft.
//!
//! # Responsibility
//! - Define the single persisted entity (`Note`) and its enumerated fields.
//! - Define the explicit draft record consumed by the creation flow.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` that is never reused.
//! - Note text is never empty once a note exists.
//! - Only `completed` changes after creation; there is no edit path.

pub mod draft;
pub mod note;
pub mod timestamp;

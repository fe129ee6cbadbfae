//! Persistence adapter layer.
//!
//! # Responsibility
//! - Define the key-value storage contract and its implementations.
//! - Encode the note collection as one snapshot blob.
//!
//! # Invariants
//! - The whole collection is always written as a unit under one key.
//! - Read failures degrade to an empty collection instead of erroring startup.

pub mod kv_store;
pub mod note_snapshot;

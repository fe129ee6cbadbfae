//! Core use-case services.
//!
//! # Responsibility
//! - Own the note collection and keep durable storage converging on it.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod clock;
pub mod note_store;
pub mod snapshot_writer;

//! Note search.
//!
//! # Responsibility
//! - Derive the visible note list from the full collection and a query.

pub mod filter;

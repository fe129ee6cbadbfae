//! Flutter-facing bridge for Taskpad core.

pub mod api;

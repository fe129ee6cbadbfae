//! Overlay motion state machines for the slide-in panels.
//!
//! # Responsibility
//! - Map open/close commands and drag input to an animated dismiss offset.
//! - Advance animations through an explicit, render-independent tick.
//!
//! # Invariants
//! - `offset == 0` means fully shown; `dismissed_offset` means fully hidden.
//! - Drag deltas are applied synchronously in arrival order.
//! - Each overlay owns its own state; overlays never coordinate.

mod animation;
mod motion;

pub use animation::{Animation, SpringConfig};
pub use motion::{
    advance, DismissAxis, DragDelta, DragInput, MotionConfig, MotionEvent, OverlayController,
    OverlayKind, OverlayMotionState, OverlayPhase,
};

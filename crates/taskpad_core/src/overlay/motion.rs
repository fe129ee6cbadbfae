//! Per-overlay motion controller.
//!
//! `Closed -> Opening -> Open -> DraggingToClose -> {Closing -> Closed | Open}`
//!
//! Drag input follows a "should I take this gesture" handshake: the host
//! offers each move to [`DragInput::on_drag_start`] until it returns `true`,
//! then streams the rest of the gesture through `on_drag_move` and finishes
//! with `on_drag_end`. All deltas are cumulative displacement since the
//! gesture began.

use crate::overlay::animation::{Animation, SpringConfig};
use log::debug;
use std::time::Duration;

/// Axis along which an overlay is dragged away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissAxis {
    Horizontal,
    Vertical,
}

impl DismissAxis {
    /// Displacement along this axis; positive is the dismissing direction.
    pub fn component(self, delta: DragDelta) -> f64 {
        match self {
            Self::Horizontal => delta.dx,
            Self::Vertical => delta.dy,
        }
    }
}

/// The two slide-in panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Help/menu drawer, dismissed by dragging right.
    HelpDrawer,
    /// Note-creation sheet, dismissed by dragging down.
    CreationSheet,
}

impl OverlayKind {
    pub fn axis(self) -> DismissAxis {
        match self {
            Self::HelpDrawer => DismissAxis::Horizontal,
            Self::CreationSheet => DismissAxis::Vertical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HelpDrawer => "help_drawer",
            Self::CreationSheet => "creation_sheet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "help_drawer" | "drawer" | "menu" => Some(Self::HelpDrawer),
            "creation_sheet" | "sheet" | "modal" => Some(Self::CreationSheet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Closed,
    Opening,
    Open,
    DraggingToClose,
    Closing,
}

impl OverlayPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::DraggingToClose => "dragging_to_close",
            Self::Closing => "closing",
        }
    }
}

/// Tunables shared by both overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// Offset at which the overlay is fully off screen.
    pub dismissed_offset: f64,
    pub open_duration: Duration,
    pub close_duration: Duration,
    /// Displacement a gesture must exceed before it is taken.
    pub drag_deadzone: f64,
    /// Release displacement beyond which the overlay closes.
    pub commit_threshold: f64,
    pub spring: SpringConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            dismissed_offset: 300.0,
            open_duration: Duration::from_millis(300),
            close_duration: Duration::from_millis(300),
            drag_deadzone: 10.0,
            commit_threshold: 150.0,
            spring: SpringConfig::default(),
        }
    }
}

/// Cumulative gesture displacement since the drag began.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragDelta {
    pub dx: f64,
    pub dy: f64,
}

impl DragDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Gesture contract, independent of how gestures are captured.
pub trait DragInput {
    /// Offers a move to the overlay; `true` means the gesture is now owned.
    fn on_drag_start(&mut self, delta: DragDelta) -> bool;
    fn on_drag_move(&mut self, delta: DragDelta);
    fn on_drag_end(&mut self, delta: DragDelta);
}

/// Phase milestones reported by [`OverlayController::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// Open animation finished.
    Opened,
    /// Overlay finished closing and should be hidden.
    Closed,
    /// Spring-back after a cancelled drag came to rest.
    SettledOpen,
}

/// Transient motion state of one overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMotionState {
    pub phase: OverlayPhase,
    pub offset: f64,
    pub animation: Option<Animation>,
}

impl OverlayMotionState {
    /// Resting hidden state.
    pub fn closed(config: &MotionConfig) -> Self {
        Self {
            phase: OverlayPhase::Closed,
            offset: config.dismissed_offset,
            animation: None,
        }
    }
}

/// Advances `state` by `elapsed` without side effects.
///
/// Completing an open lands in `Open` at offset 0; completing a close
/// resets to the resting `Closed` state.
pub fn advance(
    state: &OverlayMotionState,
    elapsed: Duration,
    config: &MotionConfig,
) -> OverlayMotionState {
    let Some(animation) = state.animation else {
        return *state;
    };

    let (offset, animation) = animation.step(state.offset, elapsed, &config.spring);
    if animation.is_some() {
        return OverlayMotionState {
            phase: state.phase,
            offset,
            animation,
        };
    }

    match state.phase {
        OverlayPhase::Opening => OverlayMotionState {
            phase: OverlayPhase::Open,
            offset: 0.0,
            animation: None,
        },
        OverlayPhase::Closing => OverlayMotionState::closed(config),
        phase => OverlayMotionState {
            phase,
            offset,
            animation: None,
        },
    }
}

/// Motion state machine for one overlay.
#[derive(Debug, Clone)]
pub struct OverlayController {
    kind: OverlayKind,
    config: MotionConfig,
    state: OverlayMotionState,
}

impl OverlayController {
    pub fn new(kind: OverlayKind) -> Self {
        Self::with_config(kind, MotionConfig::default())
    }

    pub fn with_config(kind: OverlayKind, config: MotionConfig) -> Self {
        Self {
            kind,
            state: OverlayMotionState::closed(&config),
            config,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> &OverlayMotionState {
        &self.state
    }

    pub fn phase(&self) -> OverlayPhase {
        self.state.phase
    }

    pub fn offset(&self) -> f64 {
        self.state.offset
    }

    /// Whether the overlay should be mounted on screen.
    pub fn is_visible(&self) -> bool {
        self.state.phase != OverlayPhase::Closed
    }

    pub fn is_animating(&self) -> bool {
        self.state.animation.is_some()
    }

    /// Starts the open animation from the fully dismissed offset.
    ///
    /// No-op while already opening, open or being dragged.
    pub fn open(&mut self) {
        match self.state.phase {
            OverlayPhase::Closed | OverlayPhase::Closing => {
                let from = self.config.dismissed_offset;
                self.transition(
                    OverlayPhase::Opening,
                    from,
                    Some(Animation::timing(from, 0.0, self.config.open_duration)),
                    "open",
                );
            }
            OverlayPhase::Opening | OverlayPhase::Open | OverlayPhase::DraggingToClose => {}
        }
    }

    /// Animates to the dismissed offset, then closes.
    pub fn close(&mut self) {
        match self.state.phase {
            OverlayPhase::Opening | OverlayPhase::Open | OverlayPhase::DraggingToClose => {
                self.begin_closing("close");
            }
            OverlayPhase::Closing | OverlayPhase::Closed => {}
        }
    }

    /// Closes a visible overlay, opens a hidden one.
    pub fn toggle(&mut self) {
        if self.is_visible() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Advances the running animation and reports milestones.
    pub fn tick(&mut self, elapsed: Duration) -> Option<MotionEvent> {
        let before = self.state;
        self.state = advance(&before, elapsed, &self.config);

        let event = match (before.phase, self.state.phase) {
            (OverlayPhase::Opening, OverlayPhase::Open) => Some(MotionEvent::Opened),
            (OverlayPhase::Closing, OverlayPhase::Closed) => Some(MotionEvent::Closed),
            (OverlayPhase::Open, OverlayPhase::Open)
                if before.animation.is_some() && self.state.animation.is_none() =>
            {
                Some(MotionEvent::SettledOpen)
            }
            _ => None,
        };
        if let Some(event) = event {
            debug!(
                "event=overlay_tick module=overlay overlay={} milestone={:?} offset={}",
                self.kind.as_str(),
                event,
                self.state.offset
            );
        }
        event
    }

    fn begin_closing(&mut self, trigger: &str) {
        let from = self.state.offset;
        self.transition(
            OverlayPhase::Closing,
            from,
            Some(Animation::timing(
                from,
                self.config.dismissed_offset,
                self.config.close_duration,
            )),
            trigger,
        );
    }

    fn transition(
        &mut self,
        phase: OverlayPhase,
        offset: f64,
        animation: Option<Animation>,
        trigger: &str,
    ) {
        debug!(
            "event=overlay_transition module=overlay overlay={} from={} to={} trigger={} offset={}",
            self.kind.as_str(),
            self.state.phase.as_str(),
            phase.as_str(),
            trigger,
            offset
        );
        self.state = OverlayMotionState {
            phase,
            offset,
            animation,
        };
    }
}

impl DragInput for OverlayController {
    fn on_drag_start(&mut self, delta: DragDelta) -> bool {
        if self.state.phase != OverlayPhase::Open {
            return false;
        }
        let displacement = self.kind.axis().component(delta);
        if displacement.abs() <= self.config.drag_deadzone || displacement <= 0.0 {
            return false;
        }

        self.transition(
            OverlayPhase::DraggingToClose,
            displacement,
            None,
            "drag_start",
        );
        true
    }

    fn on_drag_move(&mut self, delta: DragDelta) {
        if self.state.phase != OverlayPhase::DraggingToClose {
            return;
        }
        let displacement = self.kind.axis().component(delta);
        if displacement > 0.0 {
            self.state.offset = displacement;
        }
    }

    fn on_drag_end(&mut self, delta: DragDelta) {
        if self.state.phase != OverlayPhase::DraggingToClose {
            return;
        }
        let displacement = self.kind.axis().component(delta);
        if displacement > self.config.commit_threshold {
            self.begin_closing("drag_release");
        } else {
            let offset = self.state.offset;
            self.transition(
                OverlayPhase::Open,
                offset,
                Some(Animation::spring(0.0)),
                "drag_cancel",
            );
        }
    }
}

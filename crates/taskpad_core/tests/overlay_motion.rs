use std::time::Duration;
use taskpad_core::{
    advance, DragDelta, DragInput, MotionConfig, MotionEvent, OverlayController, OverlayKind,
    OverlayMotionState, OverlayPhase,
};

fn open_sheet() -> OverlayController {
    let mut sheet = OverlayController::new(OverlayKind::CreationSheet);
    sheet.open();
    assert_eq!(sheet.tick(Duration::from_millis(300)), Some(MotionEvent::Opened));
    assert_eq!(sheet.offset(), 0.0);
    sheet
}

fn release_after(sheet: &mut OverlayController, distance: f64) {
    assert!(sheet.on_drag_start(DragDelta::new(0.0, 11.0)));
    sheet.on_drag_move(DragDelta::new(0.0, distance));
    assert_eq!(sheet.offset(), distance);
    sheet.on_drag_end(DragDelta::new(0.0, distance));
}

#[test]
fn release_past_threshold_closes_sheet() {
    let mut sheet = open_sheet();
    release_after(&mut sheet, 151.0);
    assert_eq!(sheet.phase(), OverlayPhase::Closing);

    assert_eq!(sheet.tick(Duration::from_millis(300)), Some(MotionEvent::Closed));
    assert_eq!(sheet.phase(), OverlayPhase::Closed);
    assert_eq!(sheet.offset(), 300.0);
    assert!(!sheet.is_visible());
}

#[test]
fn release_short_of_threshold_springs_back_open() {
    let mut sheet = open_sheet();
    release_after(&mut sheet, 149.0);
    assert_eq!(sheet.phase(), OverlayPhase::Open);
    assert!(sheet.is_animating());

    let mut settled = None;
    for _ in 0..300 {
        if let Some(event) = sheet.tick(Duration::from_millis(16)) {
            settled = Some(event);
            break;
        }
    }
    assert_eq!(settled, Some(MotionEvent::SettledOpen));
    assert_eq!(sheet.phase(), OverlayPhase::Open);
    assert_eq!(sheet.offset(), 0.0);
}

#[test]
fn release_exactly_at_threshold_does_not_close() {
    let mut sheet = open_sheet();
    release_after(&mut sheet, 150.0);
    assert_eq!(sheet.phase(), OverlayPhase::Open);
}

#[test]
fn movement_inside_deadzone_is_ignored() {
    let mut sheet = open_sheet();
    assert!(!sheet.on_drag_start(DragDelta::new(0.0, 9.0)));
    assert!(!sheet.on_drag_start(DragDelta::new(0.0, 10.0)));
    sheet.on_drag_move(DragDelta::new(0.0, 200.0));
    sheet.on_drag_end(DragDelta::new(0.0, 200.0));

    assert_eq!(sheet.phase(), OverlayPhase::Open);
    assert_eq!(sheet.offset(), 0.0);
}

#[test]
fn gestures_against_dismiss_direction_are_ignored() {
    let mut sheet = open_sheet();
    assert!(!sheet.on_drag_start(DragDelta::new(0.0, -40.0)));
    // Horizontal motion never arms the vertical sheet.
    assert!(!sheet.on_drag_start(DragDelta::new(40.0, 0.0)));

    let mut drawer = OverlayController::new(OverlayKind::HelpDrawer);
    drawer.open();
    drawer.tick(Duration::from_millis(300));
    assert!(drawer.on_drag_start(DragDelta::new(40.0, 0.0)));
    drawer.on_drag_move(DragDelta::new(-5.0, 0.0));
    assert_eq!(drawer.offset(), 40.0);
}

#[test]
fn drag_is_refused_while_animating_or_closed() {
    let mut sheet = OverlayController::new(OverlayKind::CreationSheet);
    assert!(!sheet.on_drag_start(DragDelta::new(0.0, 50.0)));

    sheet.open();
    assert_eq!(sheet.phase(), OverlayPhase::Opening);
    assert!(!sheet.on_drag_start(DragDelta::new(0.0, 50.0)));
}

#[test]
fn open_restarts_from_dismissed_offset() {
    let mut sheet = open_sheet();
    sheet.close();
    sheet.tick(Duration::from_millis(100));
    assert_eq!(sheet.phase(), OverlayPhase::Closing);

    sheet.open();
    assert_eq!(sheet.phase(), OverlayPhase::Opening);
    assert_eq!(sheet.offset(), 300.0);
}

#[test]
fn toggle_flips_visibility() {
    let mut drawer = OverlayController::new(OverlayKind::HelpDrawer);
    drawer.toggle();
    assert!(drawer.is_visible());
    drawer.tick(Duration::from_millis(300));

    drawer.toggle();
    assert_eq!(drawer.phase(), OverlayPhase::Closing);
    assert_eq!(drawer.tick(Duration::from_millis(300)), Some(MotionEvent::Closed));
    assert!(!drawer.is_visible());
}

#[test]
fn open_animation_moves_monotonically_toward_zero() {
    let config = MotionConfig::default();
    let mut sheet = OverlayController::new(OverlayKind::CreationSheet);
    sheet.open();

    let mut state: OverlayMotionState = *sheet.state();
    let mut previous = state.offset;
    for _ in 0..30 {
        state = advance(&state, Duration::from_millis(10), &config);
        assert!(state.offset <= previous);
        previous = state.offset;
    }
    assert_eq!(state.phase, OverlayPhase::Open);
    assert_eq!(state.offset, 0.0);
}

#[test]
fn advance_is_pure_and_idle_states_do_not_move() {
    let config = MotionConfig::default();
    let closed = OverlayMotionState::closed(&config);
    assert_eq!(advance(&closed, Duration::from_secs(1), &config), closed);

    let mut sheet = OverlayController::new(OverlayKind::CreationSheet);
    sheet.open();
    let snapshot = *sheet.state();
    let first = advance(&snapshot, Duration::from_millis(120), &config);
    let second = advance(&snapshot, Duration::from_millis(120), &config);
    assert_eq!(first, second);
    assert_eq!(*sheet.state(), snapshot);
}

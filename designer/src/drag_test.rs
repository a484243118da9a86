#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

// =============================================================
// Grab offset
// =============================================================

#[test]
fn first_move_keeps_grab_offset() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();

    // Grab the bride block 30px right and 10px below its top-left.
    drag.begin(Slot::BrideSignature, pt(130.0, 660.0), &store);
    let update = drag.update(pt(131.0, 660.0), &mut store).unwrap();

    assert_eq!(update.position, pt(101.0, 650.0));
    assert_eq!(store.position(Slot::BrideSignature), pt(101.0, 650.0));
}

#[test]
fn final_position_is_last_pointer_minus_initial_offset() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    let initial = store.position(Slot::GroomSignature);
    let p0 = pt(800.0, 700.0);
    let path = [pt(790.0, 690.0), pt(500.0, 300.0), pt(-20.0, 40.5), pt(612.25, 333.75)];

    drag.begin(Slot::GroomSignature, p0, &store);
    for p in path {
        drag.update(p, &mut store);
    }
    drag.end();

    let last = path[path.len() - 1];
    assert_eq!(store.position(Slot::GroomSignature), last - (p0 - initial));
}

#[test]
fn pointer_down_without_move_does_not_move_slot() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::CounselorSignature, pt(500.0, 700.0), &store);
    drag.end();
    assert_eq!(store.position(Slot::CounselorSignature), pt(428.0, 650.0));
}

#[test]
fn drag_does_not_clamp_to_canvas() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::BrideSignature, pt(100.0, 650.0), &store);
    drag.update(pt(5000.0, -300.0), &mut store);
    assert_eq!(store.position(Slot::BrideSignature), pt(5000.0, -300.0));
}

#[test]
fn non_finite_pointer_is_ignored() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::BrideSignature, pt(110.0, 660.0), &store);
    assert!(drag.update(pt(f64::NAN, 10.0), &mut store).is_none());
    assert_eq!(store.position(Slot::BrideSignature), pt(100.0, 650.0));
    assert!(drag.is_dragging());
}

// =============================================================
// Isolation
// =============================================================

#[test]
fn dragging_one_slot_never_moves_another() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    let before_bride = store.position(Slot::BrideSignature);
    let before_groom = store.position(Slot::GroomSignature);

    drag.begin(Slot::CounselorSignature, pt(440.0, 660.0), &store);
    for i in 0..50 {
        drag.update(pt(f64::from(i) * 7.0, f64::from(i) * -3.0), &mut store);
    }
    drag.end();

    assert_eq!(store.position(Slot::BrideSignature), before_bride);
    assert_eq!(store.position(Slot::GroomSignature), before_groom);
}

// =============================================================
// End / idle
// =============================================================

#[test]
fn update_while_idle_is_noop() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    assert!(drag.update(pt(1.0, 1.0), &mut store).is_none());
    assert_eq!(*store.layout(), crate::layout::Layout::default());
}

#[test]
fn end_is_idempotent() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    assert_eq!(drag.end(), None);

    drag.begin(Slot::GroomSignature, pt(760.0, 655.0), &store);
    drag.update(pt(700.0, 600.0), &mut store);
    let after_move = *store.layout();

    assert_eq!(drag.end(), Some(Slot::GroomSignature));
    assert_eq!(drag.end(), None);
    assert_eq!(*store.layout(), after_move);
    assert_eq!(drag.state(), DragState::Idle);
}

#[test]
fn moves_after_end_do_nothing() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::BrideSignature, pt(100.0, 650.0), &store);
    drag.update(pt(200.0, 650.0), &mut store);
    drag.end();
    drag.update(pt(900.0, 900.0), &mut store);
    assert_eq!(store.position(Slot::BrideSignature), pt(200.0, 650.0));
}

// =============================================================
// Overlapping gestures
// =============================================================

#[test]
fn begin_while_dragging_ends_previous_drag() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::BrideSignature, pt(100.0, 650.0), &store);
    drag.update(pt(150.0, 600.0), &mut store);

    let ended = drag.begin(Slot::GroomSignature, pt(760.0, 660.0), &store);
    assert_eq!(ended, Some(Slot::BrideSignature));
    assert_eq!(drag.dragging(), Some(Slot::GroomSignature));

    drag.update(pt(770.0, 660.0), &mut store);
    assert_eq!(store.position(Slot::BrideSignature), pt(150.0, 600.0));
    assert_eq!(store.position(Slot::GroomSignature), pt(760.0, 650.0));
}

#[test]
fn regrabbing_same_slot_recomputes_offset() {
    let mut store = LayoutStore::new();
    let mut drag = DragController::new();
    drag.begin(Slot::BrideSignature, pt(110.0, 660.0), &store);
    drag.update(pt(210.0, 660.0), &mut store);

    // Second grab at a different point inside the moved block.
    drag.begin(Slot::BrideSignature, pt(300.0, 700.0), &store);
    drag.update(pt(310.0, 700.0), &mut store);

    assert_eq!(store.position(Slot::BrideSignature), pt(210.0, 650.0));
}

#[test]
fn begin_from_idle_reports_nothing_ended() {
    let store = LayoutStore::new();
    let mut drag = DragController::new();
    assert_eq!(drag.begin(Slot::CounselorSignature, pt(0.0, 0.0), &store), None);
    assert!(matches!(
        drag.state(),
        DragState::Dragging { slot: Slot::CounselorSignature, grab_offset } if grab_offset == pt(-428.0, -650.0)
    ));
}

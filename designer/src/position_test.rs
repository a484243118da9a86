#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn sub_is_componentwise() {
    let d = Position::new(130.0, 670.0) - Position::new(100.0, 650.0);
    assert_eq!(d, Position::new(30.0, 20.0));
}

#[test]
fn add_inverts_sub() {
    let a = Position::new(-12.5, 40.0);
    let b = Position::new(3.0, -7.25);
    assert_eq!((a - b) + b, a);
}

#[test]
fn from_tuple() {
    assert_eq!(Position::from((428.0, 650.0)), Position::new(428.0, 650.0));
}

#[test]
fn default_is_origin() {
    assert_eq!(Position::default(), Position::new(0.0, 0.0));
}

#[test]
fn non_finite_detected() {
    assert!(Position::new(1.0, 2.0).is_finite());
    assert!(!Position::new(f64::NAN, 2.0).is_finite());
    assert!(!Position::new(1.0, f64::INFINITY).is_finite());
}

#[test]
fn within_canvas_includes_edges_and_rejects_outside() {
    assert!(Position::new(0.0, 0.0).within_canvas());
    assert!(Position::new(1056.0, 816.0).within_canvas());
    assert!(!Position::new(-1.0, 10.0).within_canvas());
    assert!(!Position::new(10.0, 900.0).within_canvas());
}

#[test]
fn serde_shape_is_plain_xy() {
    let json = serde_json::to_value(Position::new(100.0, 650.0)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 100.0, "y": 650.0 }));
}

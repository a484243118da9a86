use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "position_test.rs"]
mod position_test;

/// A point on the certificate canvas, in logical pixels from the top-left.
///
/// Pointer coordinates and slot positions share this type. Values are not
/// bounded to the canvas; a slot may be dragged partly or fully off it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether the point lies inside the fixed canvas bounds.
    #[must_use]
    pub fn within_canvas(self) -> bool {
        (0.0..=crate::consts::CANVAS_WIDTH).contains(&self.x) && (0.0..=crate::consts::CANVAS_HEIGHT).contains(&self.y)
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

//! Screen-space primitives used by linked views.
//!
//! All coordinates are in pixels. Plot-local coordinates put the origin at
//! the top-left corner of a view's plotting area.

use serde::{Deserialize, Serialize};

/// A point in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// X value in pixels.
    pub x: f64,
    /// Y value in pixels.
    pub y: f64,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from its origin and size.
    pub fn from_origin_size(origin: ScreenPoint, width: f64, height: f64) -> Self {
        Self {
            min: origin,
            max: ScreenPoint::new(origin.x + width, origin.y + height),
        }
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive, finite area.
    pub fn is_valid(&self) -> bool {
        self.width().is_finite() && self.height().is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Check whether the point lies inside the rectangle, edges included.
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Express a point relative to the rectangle's top-left corner.
    pub fn to_local(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(point.x - self.min.x, point.y - self.min.y)
    }
}

/// Space reserved on each side of a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Insets {
    /// Create insets in CSS order (top, right, bottom, left).
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same inset on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Combined left and right insets.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Combined top and bottom insets.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_coordinates_offset_by_origin() {
        let rect = ScreenRect::from_origin_size(ScreenPoint::new(90.0, 80.0), 200.0, 100.0);
        assert!(rect.contains(ScreenPoint::new(90.0, 180.0)));
        assert!(!rect.contains(ScreenPoint::new(89.0, 100.0)));
        assert_eq!(
            rect.to_local(ScreenPoint::new(140.0, 130.0)),
            ScreenPoint::new(50.0, 50.0)
        );
    }

    #[test]
    fn insets_sum_per_axis() {
        let insets = Insets::new(20.0, 30.0, 20.0, 30.0);
        assert_eq!(insets.horizontal(), 60.0);
        assert_eq!(insets.vertical(), 40.0);
        assert_eq!(Insets::uniform(5.0).vertical(), 10.0);
    }
}

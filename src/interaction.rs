//! Pointer hit testing and lens focus for linked views.

use crate::geom::{ScreenPoint, ScreenRect};

/// Axis of a two-dimensional view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    /// Component of a point along this axis.
    pub fn component(self, point: ScreenPoint) -> f64 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }
}

/// Interaction hit regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum HitRegion {
    /// Inside the plotting area, at the given plot-local position.
    Plot(LocalPoint),
    /// Anywhere else.
    Outside,
}

/// Plot-local pointer position, guaranteed to lie inside the plotting area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LocalPoint(ScreenPoint);

impl LocalPoint {
    pub(crate) fn point(self) -> ScreenPoint {
        self.0
    }
}

/// Classify a pointer position against a view's plotting area.
pub(crate) fn hit_test(plot: ScreenRect, pointer: ScreenPoint) -> HitRegion {
    if plot.is_valid() && plot.contains(pointer) {
        HitRegion::Plot(LocalPoint(plot.to_local(pointer)))
    } else {
        HitRegion::Outside
    }
}

/// Check whether a plot-local coordinate lies within `[0, length]`.
pub(crate) fn within_axis(coordinate: f64, length: f64) -> bool {
    coordinate.is_finite() && coordinate >= 0.0 && coordinate <= length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_reports_local_position() {
        let plot = ScreenRect::from_origin_size(ScreenPoint::new(90.0, 80.0), 690.0, 280.0);
        match hit_test(plot, ScreenPoint::new(100.0, 100.0)) {
            HitRegion::Plot(local) => assert_eq!(local.point(), ScreenPoint::new(10.0, 20.0)),
            HitRegion::Outside => panic!("pointer inside plot"),
        }
        assert_eq!(hit_test(plot, ScreenPoint::new(10.0, 100.0)), HitRegion::Outside);
    }

    #[test]
    fn degenerate_plot_never_hits() {
        let plot = ScreenRect::from_origin_size(ScreenPoint::new(0.0, 0.0), 0.0, 100.0);
        assert_eq!(hit_test(plot, ScreenPoint::new(0.0, 10.0)), HitRegion::Outside);
    }

    #[test]
    fn axis_bounds_are_inclusive() {
        assert!(within_axis(0.0, 10.0));
        assert!(within_axis(10.0, 10.0));
        assert!(!within_axis(-0.5, 10.0));
        assert!(!within_axis(f64::NAN, 10.0));
        assert_eq!(Axis::Y.component(ScreenPoint::new(1.0, 2.0)), 2.0);
    }
}

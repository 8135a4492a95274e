//! Ordered intervals and data bounds.

use serde::{Deserialize, Serialize};

/// An ordered pair of interval endpoints.
///
/// Unlike [`Bounds`], an extent keeps its direction: `Extent::new(500.0, 0.0)`
/// is a valid descending pixel range for a Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// First endpoint.
    pub start: f64,
    /// Second endpoint.
    pub end: f64,
}

impl Extent {
    /// Create an extent from two endpoints, keeping their order.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Signed span (`end - start`).
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Smaller endpoint.
    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    /// Larger endpoint.
    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    /// Check whether the endpoints are descending.
    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    /// Check whether both endpoints are finite.
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Check whether the extent is finite and has non-zero span.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() != 0.0
    }
}

impl From<[f64; 2]> for Extent {
    fn from([start, end]: [f64; 2]) -> Self {
        Self::new(start, end)
    }
}

impl From<(f64, f64)> for Extent {
    fn from((start, end): (f64, f64)) -> Self {
        Self::new(start, end)
    }
}

/// Inclusive min/max bounds accumulated from data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Bounds {
    /// Create bounds, swapping if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Collect bounds over finite values. Returns `None` when nothing finite was seen.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut bounds: Option<Self> = None;
        for value in values {
            if !value.is_finite() {
                continue;
            }
            match bounds.as_mut() {
                Some(existing) => existing.expand_to_include(value),
                None => bounds = Some(Self::new(value, value)),
            }
        }
        bounds
    }

    /// Expand the bounds to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Extent running from zero to the ceiling of the maximum.
    ///
    /// Charts anchor their axes at zero and round the far end up to a whole
    /// unit before niceing.
    pub fn zero_to_ceil(&self) -> Extent {
        let end = self.max.ceil();
        if end <= 0.0 {
            return Extent::new(0.0, 1.0);
        }
        Extent::new(0.0, end)
    }
}

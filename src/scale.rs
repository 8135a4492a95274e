//! Continuous axis scales mapping a data domain onto a pixel range.

use serde::{Deserialize, Serialize};

use crate::extent::Extent;

/// Upper bound on generated ticks, whatever the requested count.
const MAX_TICKS: usize = 10_000;

/// Common surface shared by plain and distorted scales.
///
/// Anything that renders an axis or positions marks should only rely on this
/// trait, so a [`DistortionScale`](crate::lens::DistortionScale) can stand in
/// wherever a plain scale is expected.
pub trait Scale {
    /// Map a domain value to a range value. Unmappable inputs yield `NaN`.
    fn map(&self, value: f64) -> f64;

    /// Map a range value back into the domain.
    fn invert(&self, output: f64) -> f64;

    /// Current domain.
    fn domain(&self) -> Extent;

    /// Current range.
    fn range(&self) -> Extent;

    /// Replace the domain.
    fn set_domain(&mut self, domain: Extent);

    /// Replace the range.
    fn set_range(&mut self, range: Extent);

    /// Extend the domain outward to round tick multiples.
    fn nice(&mut self, count: usize);

    /// Roughly `count` evenly stepped values inside the domain.
    fn ticks(&self, count: usize) -> Vec<f64>;
}

/// Mapping applied to domain values before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Linear scaling.
    #[default]
    Linear,
    /// Base-10 logarithmic scaling.
    Log10,
}

impl ScaleKind {
    /// Map a value into interpolation space.
    pub fn map_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => {
                if value <= 0.0 {
                    None
                } else {
                    Some(value.log10())
                }
            }
        }
    }

    /// Invert a value from interpolation space back into the domain.
    pub fn invert_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => Some(10_f64.powf(value)),
        }
    }

    /// Check whether a domain is usable for this kind.
    pub fn is_domain_valid(self, domain: Extent) -> bool {
        if !domain.is_finite() {
            return false;
        }
        match self {
            Self::Linear => true,
            Self::Log10 => domain.min() > 0.0,
        }
    }
}

/// Continuous scale with a linear or logarithmic domain.
///
/// Domain and range keep their direction, so `range(height, 0)` flips a Y
/// axis. Values outside the domain are extrapolated, not clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousScale {
    kind: ScaleKind,
    domain: Extent,
    range: Extent,
    round: bool,
}

impl ContinuousScale {
    /// Create a scale of the given kind.
    pub fn new(kind: ScaleKind, domain: impl Into<Extent>, range: impl Into<Extent>) -> Self {
        Self {
            kind,
            domain: domain.into(),
            range: range.into(),
            round: false,
        }
    }

    /// Create a linear scale.
    pub fn linear(domain: impl Into<Extent>, range: impl Into<Extent>) -> Self {
        Self::new(ScaleKind::Linear, domain, range)
    }

    /// Create a base-10 logarithmic scale.
    pub fn log10(domain: impl Into<Extent>, range: impl Into<Extent>) -> Self {
        Self::new(ScaleKind::Log10, domain, range)
    }

    /// Round mapped outputs to whole pixels.
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    /// Access the scale kind.
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Check whether outputs are rounded.
    pub fn is_rounded(&self) -> bool {
        self.round
    }

    fn interpolation_domain(&self) -> Option<(f64, f64)> {
        let start = self.kind.map_value(self.domain.start)?;
        let end = self.kind.map_value(self.domain.end)?;
        Some((start, end))
    }
}

impl Scale for ContinuousScale {
    fn map(&self, value: f64) -> f64 {
        let (Some((d0, d1)), Some(v)) = (self.interpolation_domain(), self.kind.map_value(value))
        else {
            return f64::NAN;
        };
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (v - d0) / span };
        let out = interpolate(self.range.start, self.range.end, t);
        if self.round { out.round() } else { out }
    }

    fn invert(&self, output: f64) -> f64 {
        let Some((d0, d1)) = self.interpolation_domain() else {
            return f64::NAN;
        };
        let span = self.range.span();
        if span == 0.0 || !output.is_finite() {
            return f64::NAN;
        }
        let t = (output - self.range.start) / span;
        self.kind
            .invert_value(interpolate(d0, d1, t))
            .unwrap_or(f64::NAN)
    }

    fn domain(&self) -> Extent {
        self.domain
    }

    fn range(&self) -> Extent {
        self.range
    }

    fn set_domain(&mut self, domain: Extent) {
        self.domain = domain;
    }

    fn set_range(&mut self, range: Extent) {
        self.range = range;
    }

    fn nice(&mut self, count: usize) {
        if !self.kind.is_domain_valid(self.domain) {
            return;
        }
        let reversed = self.domain.is_reversed();
        let (lo, hi) = (self.domain.min(), self.domain.max());
        let niced = match self.kind {
            ScaleKind::Linear => nice_linear(lo, hi, count),
            ScaleKind::Log10 => Some((
                10_f64.powi(lo.log10().floor() as i32),
                10_f64.powi(hi.log10().ceil() as i32),
            )),
        };
        if let Some((lo, hi)) = niced {
            self.domain = if reversed {
                Extent::new(hi, lo)
            } else {
                Extent::new(lo, hi)
            };
        }
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        if count == 0 || !self.kind.is_domain_valid(self.domain) {
            return Vec::new();
        }
        let (lo, hi) = (self.domain.min(), self.domain.max());
        let mut ticks = match self.kind {
            ScaleKind::Linear => linear_ticks(lo, hi, count),
            ScaleKind::Log10 => log_ticks(lo, hi, count),
        };
        if self.domain.is_reversed() {
            ticks.reverse();
        }
        ticks
    }
}

fn interpolate(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Step of roughly `(hi - lo) / count`, rounded to 1, 2 or 5 times a power of ten.
pub(crate) fn tick_step(lo: f64, hi: f64, count: usize) -> Option<f64> {
    if count == 0 || !(hi > lo) {
        return None;
    }
    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor() as i32;
    let base = 10_f64.powi(power);
    let error = raw / base;
    let factor = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= 2_f64.sqrt() {
        2.0
    } else {
        1.0
    };
    let step = factor * base;
    (step.is_finite() && step > 0.0).then_some(step)
}

fn nice_linear(mut lo: f64, mut hi: f64, count: usize) -> Option<(f64, f64)> {
    let mut previous: Option<f64> = None;
    // Each pass can widen the domain enough to change the step; settle in a few rounds.
    for _ in 0..10 {
        let step = tick_step(lo, hi, count)?;
        if previous == Some(step) {
            break;
        }
        lo = (lo / step).floor() * step;
        hi = (hi / step).ceil() * step;
        previous = Some(step);
    }
    Some((lo, hi))
}

fn linear_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if lo == hi {
        return vec![lo];
    }
    let Some(step) = tick_step(lo, hi, count) else {
        return Vec::new();
    };
    // Sub-unit steps work on the integer inverse so values like 0.3 stay exact.
    let inverse = (step < 1.0).then(|| (1.0 / step).round());
    let (first, last) = match inverse {
        Some(inverse) => ((lo * inverse).ceil(), (hi * inverse).floor()),
        None => ((lo / step).ceil(), (hi / step).floor()),
    };
    let (first, last) = (first as i64, last as i64);
    if last < first {
        return Vec::new();
    }
    (first..=last)
        .take(MAX_TICKS)
        .map(|index| match inverse {
            Some(inverse) => index as f64 / inverse,
            None => index as f64 * step,
        })
        .collect()
}

fn log_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    let first = lo.log10().floor() as i32;
    let last = hi.log10().ceil() as i32;
    let decades = (last - first).max(0) as usize;
    let multiples: &[f64] = if decades < count / 2 {
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
    } else {
        &[1.0]
    };
    let mut ticks = Vec::new();
    for power in first..=last {
        let base = 10_f64.powi(power);
        for multiple in multiples {
            let value = base * multiple;
            if value >= lo && value <= hi && ticks.len() < MAX_TICKS {
                ticks.push(value);
            }
        }
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_endpoints_exactly() {
        let scale = ContinuousScale::linear([0.0, 100.0], [0.0, 500.0]);
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(100.0), 500.0);
        assert_eq!(scale.map(50.0), 250.0);
        assert_eq!(scale.map(150.0), 750.0);
    }

    #[test]
    fn reversed_range_flips_output() {
        let scale = ContinuousScale::linear([0.0, 10.0], [400.0, 0.0]);
        assert_eq!(scale.map(0.0), 400.0);
        assert_eq!(scale.map(10.0), 0.0);
        assert!((scale.invert(100.0) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn rounding_snaps_to_pixels() {
        let scale = ContinuousScale::linear([0.0, 3.0], [0.0, 100.0]).with_round(true);
        assert_eq!(scale.map(1.0), 33.0);
        assert_eq!(scale.map(2.0), 67.0);
    }

    #[test]
    fn log_scale_roundtrip_and_rejects_non_positive() {
        let scale = ContinuousScale::log10([1.0, 1000.0], [0.0, 300.0]);
        assert!((scale.map(10.0) - 100.0).abs() < 1e-9);
        assert!((scale.invert(200.0) - 100.0).abs() < 1e-9);
        assert!(scale.map(0.0).is_nan());
        assert!(scale.map(-5.0).is_nan());
    }

    #[test]
    fn nice_extends_domain_outward() {
        let mut scale = ContinuousScale::linear([0.3, 9.7], [0.0, 1.0]);
        scale.nice(10);
        assert_eq!(scale.domain(), Extent::new(0.0, 10.0));

        let mut reversed = ContinuousScale::linear([97.0, 3.0], [0.0, 1.0]);
        reversed.nice(10);
        assert_eq!(reversed.domain(), Extent::new(100.0, 0.0));
    }

    #[test]
    fn nice_log_snaps_to_decades() {
        let mut scale = ContinuousScale::log10([3.0, 420.0], [0.0, 1.0]);
        scale.nice(10);
        let domain = scale.domain();
        assert!((domain.start - 1.0).abs() < 1e-12);
        assert!((domain.end - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn linear_ticks_use_round_steps() {
        let scale = ContinuousScale::linear([0.0, 1.0], [0.0, 100.0]);
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let scale = ContinuousScale::linear([0.0, 100.0], [0.0, 1.0]);
        assert_eq!(scale.ticks(10).len(), 11);
        assert!(scale.ticks(0).is_empty());
    }

    #[test]
    fn ticks_follow_domain_direction() {
        let scale = ContinuousScale::linear([10.0, 0.0], [0.0, 1.0]);
        let ticks = scale.ticks(5);
        assert_eq!(ticks.first(), Some(&10.0));
        assert_eq!(ticks.last(), Some(&0.0));
    }

    #[test]
    fn log_ticks_cover_decades() {
        let scale = ContinuousScale::log10([1.0, 1000.0], [0.0, 1.0]);
        let ticks = scale.ticks(2);
        assert_eq!(ticks.len(), 4);
        assert!(ticks.iter().any(|value| (value - 100.0).abs() < 1e-9));
    }
}

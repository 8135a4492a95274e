//! Focus+context ("fisheye") distortion for one-dimensional scales.
//!
//! A [`DistortionScale`] wraps any [`Scale`] and warps its output around a
//! focus point in range space. Values near the focus are pushed apart, values
//! near the range ends are squeezed together, and the range endpoints and the
//! focus itself never move. The focus is always kept inside the range: a resize
//! that leaves it outside pulls it back to the nearest endpoint. With a
//! distortion of zero, or no focus, the lens is an exact passthrough.
//!
//! Each side of the focus is warped independently. For a side of length `m`
//! and normalized distance `t = |d - focus| / m`, the warped distance is
//! `(k + 1) t / (k t + 1)`, which fixes `t = 0` and `t = 1` and grows with `k`.

use thiserror::Error;
use tracing::debug;

use crate::extent::Extent;
use crate::scale::{ContinuousScale, Scale};

/// Errors raised when configuring a lens.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LensError {
    /// Distortion strength below zero would invert the lens.
    #[error("distortion strength must be >= 0, got {0}")]
    NegativeDistortion(f64),
    /// Distortion strength is NaN or infinite.
    #[error("distortion strength must be finite, got {0}")]
    NonFiniteDistortion(f64),
    /// Focus is NaN or infinite.
    #[error("focus must be finite, got {0}")]
    NonFiniteFocus(f64),
    /// Focus lies outside the current output range.
    #[error("focus {focus} lies outside the range [{min}, {max}]")]
    FocusOutsideRange {
        /// Requested focus.
        focus: f64,
        /// Smaller range endpoint.
        min: f64,
        /// Larger range endpoint.
        max: f64,
    },
}

/// Check a distortion strength without applying it.
pub fn validate_distortion(distortion: f64) -> Result<f64, LensError> {
    if !distortion.is_finite() {
        return Err(LensError::NonFiniteDistortion(distortion));
    }
    if distortion < 0.0 {
        return Err(LensError::NegativeDistortion(distortion));
    }
    Ok(distortion)
}

/// A scale wrapper applying a fisheye lens in range space.
///
/// The lens owns its base scale; callers resize it through
/// [`set_range_extent`](Self::set_range_extent) or [`base_mut`](Self::base_mut)
/// without losing focus or strength.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionScale<S = ContinuousScale> {
    base: S,
    focus: Option<f64>,
    distortion: f64,
}

impl<S: Scale> DistortionScale<S> {
    /// Wrap a scale with an inactive lens.
    pub fn new(base: S) -> Self {
        Self {
            base,
            focus: None,
            distortion: 0.0,
        }
    }

    /// Access the wrapped scale.
    pub fn base(&self) -> &S {
        &self.base
    }

    /// Access the wrapped scale mutably.
    pub fn base_mut(&mut self) -> &mut S {
        &mut self.base
    }

    /// Unwrap the base scale.
    pub fn into_base(self) -> S {
        self.base
    }

    /// Current focus in range units, if any.
    pub fn focus(&self) -> Option<f64> {
        self.focus
    }

    /// Current distortion strength.
    pub fn distortion(&self) -> f64 {
        self.distortion
    }

    /// Check whether mapping is currently an exact passthrough.
    pub fn is_identity(&self) -> bool {
        self.focus.is_none() || self.distortion <= 0.0
    }

    /// Set the focus, in range units.
    pub fn set_focus(&mut self, focus: f64) -> Result<&mut Self, LensError> {
        if !focus.is_finite() {
            return Err(LensError::NonFiniteFocus(focus));
        }
        let range = self.base.range();
        if focus < range.min() || focus > range.max() {
            return Err(LensError::FocusOutsideRange {
                focus,
                min: range.min(),
                max: range.max(),
            });
        }
        self.focus = Some(focus);
        Ok(self)
    }

    /// Focus on the output position of a domain value.
    pub fn focus_on_value(&mut self, value: f64) -> Result<&mut Self, LensError> {
        let focus = self.base.map(value);
        self.set_focus(focus)
    }

    /// Drop the focus so the lens becomes a passthrough.
    pub fn clear_focus(&mut self) -> &mut Self {
        self.focus = None;
        self
    }

    /// Set the distortion strength. Zero disables the lens.
    pub fn set_distortion(&mut self, distortion: f64) -> Result<&mut Self, LensError> {
        self.distortion = validate_distortion(distortion)?;
        Ok(self)
    }

    /// Focus and strengthen the lens in one step.
    pub fn engage(&mut self, focus: f64, distortion: f64) -> Result<&mut Self, LensError> {
        let distortion = validate_distortion(distortion)?;
        self.set_focus(focus)?;
        self.distortion = distortion;
        debug!(focus, distortion, "lens engaged");
        Ok(self)
    }

    /// Reset distortion to zero and clear the focus.
    pub fn release(&mut self) -> &mut Self {
        if !self.is_identity() {
            debug!("lens released");
        }
        self.distortion = 0.0;
        self.focus = None;
        self
    }

    /// Replace the base range, keeping strength. The focus is kept when it
    /// still lies inside the new range and clamped to its nearest end otherwise.
    pub fn set_range_extent(&mut self, range: impl Into<Extent>) -> &mut Self {
        self.base.set_range(range.into());
        self.focus = self.active_focus();
        self
    }

    /// Replace the base domain, keeping focus and strength.
    pub fn set_domain_extent(&mut self, domain: impl Into<Extent>) -> &mut Self {
        self.base.set_domain(domain.into());
        self
    }

    /// Focus clamped into the current range.
    fn active_focus(&self) -> Option<f64> {
        let range = self.base.range();
        self.focus.map(|focus| focus.clamp(range.min(), range.max()))
    }

    /// Range boundary on the side of `position` relative to `focus`.
    fn boundary(&self, focus: f64, position: f64) -> f64 {
        let range = self.base.range();
        if position < focus {
            range.min()
        } else {
            range.max()
        }
    }
}

impl<S: Scale> Scale for DistortionScale<S> {
    fn map(&self, value: f64) -> f64 {
        let undistorted = self.base.map(value);
        let Some(focus) = self.active_focus() else {
            return undistorted;
        };
        if self.distortion <= 0.0 || !undistorted.is_finite() || undistorted == focus {
            return undistorted;
        }
        let boundary = self.boundary(focus, undistorted);
        let side = (boundary - focus).abs();
        if side == 0.0 {
            return undistorted;
        }
        let t = (undistorted - focus).abs() / side;
        let k = self.distortion;
        let warped = (k + 1.0) * t / (k * t + 1.0);
        focus * (1.0 - warped) + boundary * warped
    }

    fn invert(&self, output: f64) -> f64 {
        let Some(focus) = self.active_focus() else {
            return self.base.invert(output);
        };
        if self.distortion <= 0.0 || !output.is_finite() || output == focus {
            return self.base.invert(output);
        }
        let boundary = self.boundary(focus, output);
        let side = (boundary - focus).abs();
        if side == 0.0 {
            return self.base.invert(output);
        }
        let s = (output - focus).abs() / side;
        let k = self.distortion;
        let denom = k + 1.0 - k * s;
        // Outputs past the asymptote at (k + 1) / k have no preimage.
        if denom <= 0.0 {
            return f64::NAN;
        }
        let t = s / denom;
        self.base.invert(focus * (1.0 - t) + boundary * t)
    }

    fn domain(&self) -> Extent {
        self.base.domain()
    }

    fn range(&self) -> Extent {
        self.base.range()
    }

    fn set_domain(&mut self, domain: Extent) {
        self.base.set_domain(domain);
    }

    fn set_range(&mut self, range: Extent) {
        self.set_range_extent(range);
    }

    fn nice(&mut self, count: usize) {
        self.base.nice(count);
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        self.base.ticks(count)
    }
}

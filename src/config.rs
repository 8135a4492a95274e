//! Configuration for linked views.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::Channel;
use crate::geom::{Insets, ScreenPoint, ScreenRect};
use crate::lens::{LensError, validate_distortion};

/// Errors raised by invalid view configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Margins and padding leave no plotting area.
    #[error("plotting area {width}x{height} is empty")]
    EmptyPlotArea {
        /// Resulting plot width.
        width: f64,
        /// Resulting plot height.
        height: f64,
    },
    /// Tick count of zero.
    #[error("tick count must be at least 1")]
    NoTicks,
    /// Invalid lens strength.
    #[error(transparent)]
    Lens(#[from] LensError),
}

/// Fisheye behaviour while the pointer is over the plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Distortion strength applied on pointer movement.
    pub distortion: f64,
    /// Apply the lens to the X axis.
    pub lens_x: bool,
    /// Apply the lens to the Y axis.
    pub lens_y: bool,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            distortion: 3.0,
            lens_x: true,
            lens_y: true,
        }
    }
}

impl LensConfig {
    /// Lens disabled on both axes.
    pub fn disabled() -> Self {
        Self {
            distortion: 0.0,
            lens_x: false,
            lens_y: false,
        }
    }

    /// Set the distortion strength.
    pub fn with_distortion(mut self, distortion: f64) -> Self {
        self.distortion = distortion;
        self
    }

    /// Choose which axes the lens applies to.
    pub fn with_axes(mut self, lens_x: bool, lens_y: bool) -> Self {
        self.lens_x = lens_x;
        self.lens_y = lens_y;
        self
    }
}

/// Layout and interaction settings for one linked view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Outer width in pixels.
    pub outer_width: f64,
    /// Outer height in pixels.
    pub outer_height: f64,
    /// Space between the outer box and the axes.
    pub margin: Insets,
    /// Space between the axes and the plotted marks.
    pub padding: Insets,
    /// Fisheye settings.
    pub lens: LensConfig,
    /// Approximate tick count used for niceing domains and axis ticks.
    pub tick_count: usize,
    /// Round X positions to whole pixels.
    pub round_x: bool,
    /// Channel whose hover/selection drives emphasis.
    pub selection_channel: Channel,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            outer_width: 960.0,
            outer_height: 500.0,
            margin: Insets::new(20.0, 30.0, 20.0, 30.0),
            padding: Insets::uniform(60.0),
            lens: LensConfig::default(),
            tick_count: 10,
            round_x: true,
            selection_channel: Channel::CategoryState,
        }
    }
}

impl ViewConfig {
    /// Set the outer size.
    pub fn with_size(mut self, outer_width: f64, outer_height: f64) -> Self {
        self.outer_width = outer_width;
        self.outer_height = outer_height;
        self
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    /// Set the padding.
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    /// Set the lens settings.
    pub fn with_lens(mut self, lens: LensConfig) -> Self {
        self.lens = lens;
        self
    }

    /// Set the tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Set the channel driving emphasis.
    pub fn with_selection_channel(mut self, channel: impl Into<Channel>) -> Self {
        self.selection_channel = channel.into();
        self
    }

    /// Width of the plotting area.
    pub fn plot_width(&self) -> f64 {
        self.outer_width - self.margin.horizontal() - self.padding.horizontal()
    }

    /// Height of the plotting area.
    pub fn plot_height(&self) -> f64 {
        self.outer_height - self.margin.vertical() - self.padding.vertical()
    }

    /// Plotting area in the view's outer coordinates.
    pub fn plot_rect(&self) -> ScreenRect {
        let origin = ScreenPoint::new(
            self.margin.left + self.padding.left,
            self.margin.top + self.padding.top,
        );
        ScreenRect::from_origin_size(origin, self.plot_width(), self.plot_height())
    }

    /// Check the configuration for a usable plotting area and lens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.plot_rect().is_valid() {
            return Err(ConfigError::EmptyPlotArea {
                width: self.plot_width(),
                height: self.plot_height(),
            });
        }
        if self.tick_count == 0 {
            return Err(ConfigError::NoTicks);
        }
        validate_distortion(self.lens.distortion)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plot_area_subtracts_margin_and_padding() {
        let config = ViewConfig::default();
        assert_eq!(config.plot_width(), 960.0 - 60.0 - 120.0);
        assert_eq!(config.plot_height(), 500.0 - 40.0 - 120.0);
        assert_eq!(config.plot_rect().min, ScreenPoint::new(90.0, 80.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_area_and_bad_lens() {
        let tiny = ViewConfig::default().with_size(100.0, 100.0);
        assert!(matches!(
            tiny.validate(),
            Err(ConfigError::EmptyPlotArea { .. })
        ));

        let negative = ViewConfig::default().with_lens(LensConfig::default().with_distortion(-2.0));
        assert_eq!(
            negative.validate(),
            Err(ConfigError::Lens(LensError::NegativeDistortion(-2.0)))
        );

        let no_ticks = ViewConfig::default().with_tick_count(0);
        assert_eq!(no_ticks.validate(), Err(ConfigError::NoTicks));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ViewConfig = serde_json::from_str(
            r#"{ "outer_width": 400, "lens": { "distortion": 5 }, "selection_channel": "variable-state" }"#,
        )
        .unwrap();
        assert_eq!(config.outer_width, 400.0);
        assert_eq!(config.outer_height, 500.0);
        assert_eq!(config.lens.distortion, 5.0);
        assert!(config.lens.lens_x);
        assert_eq!(config.selection_channel, Channel::VariableState);
    }
}

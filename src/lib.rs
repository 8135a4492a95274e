//! focuslens links independent chart views through a publish/subscribe bus.
//! Views share hover and selection by broadcasting it, and each can warp its
//! axes with a fisheye lens that follows the pointer.

#![forbid(unsafe_code)]

pub mod bus;
pub mod chart;
pub mod config;
pub mod extent;
pub mod filter;
pub mod geom;
pub mod interaction;
pub mod lens;
pub mod record;
pub mod render;
pub mod scale;
pub mod selection;

pub use bus::{
    BusError, Channel, CoordinationBus, HandlerFailure, Payload, PointerPayload, PublishReport,
    SelectionPayload, SubscriberId, ViewId,
};
pub use chart::{LinkedView, LinkedViewBuilder, ViewError};
pub use config::{ConfigError, LensConfig, ViewConfig};
pub use extent::{Bounds, Extent};
pub use filter::{CategoryFilter, VariableFilter};
pub use geom::{Insets, ScreenPoint, ScreenRect};
pub use interaction::Axis;
pub use lens::{DistortionScale, LensError};
pub use record::{CategoryId, Record};
pub use render::{AxisTick, Frame, ProjectedMark, Renderer};
pub use scale::{ContinuousScale, Scale, ScaleKind};
pub use selection::{Emphasis, SelectionState};

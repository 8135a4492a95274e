//! Linked chart views.
//!
//! A [`LinkedView`] is one bus client: it owns its scales, records and a local
//! copy of the broadcast selection, reacts to bus events by redrawing, and
//! publishes its own pointer position so other views can mirror the lens.
//! Drawing itself is delegated to a [`Renderer`].

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use anyhow::{Context as _, anyhow};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::bus::{
    BusError, Channel, CoordinationBus, Payload, PointerPayload, PublishReport, ViewId,
};
use crate::config::{ConfigError, ViewConfig};
use crate::extent::{Bounds, Extent};
use crate::geom::ScreenPoint;
use crate::interaction::{Axis, HitRegion, hit_test, within_axis};
use crate::lens::{DistortionScale, LensError};
use crate::record::{CategoryId, Record};
use crate::render::{Frame, ProjectedMark, Renderer, axis_ticks, project_records};
use crate::scale::{ContinuousScale, Scale, ScaleKind};
use crate::selection::{Emphasis, SelectionState};

/// Errors raised by linked view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// Invalid layout or lens settings.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Subscription failed.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// Lens rejected a focus or strength.
    #[error(transparent)]
    Lens(#[from] LensError),
    /// The view's renderer failed.
    #[error("render failed: {0:#}")]
    Render(anyhow::Error),
    /// The view is already handling an event further up the stack.
    #[error("view {0} is busy")]
    Busy(ViewId),
}

/// A subscription a view keeps alive across resizes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    /// Hover/selection broadcasts driving emphasis.
    Selection(Channel),
    /// Pointer broadcasts of another view driving this view's lenses.
    Mirror { source: ViewId, x: bool, y: bool },
}

impl Binding {
    fn channel(&self) -> Channel {
        match self {
            Self::Selection(channel) => channel.clone(),
            Self::Mirror { source, .. } => Channel::pointer(source),
        }
    }
}

struct ViewState {
    id: ViewId,
    config: ViewConfig,
    records: Vec<Record>,
    x: DistortionScale,
    y: DistortionScale,
    selection: SelectionState,
    pointer: Option<ScreenPoint>,
    redraws: u64,
    renderer: Option<Box<dyn Renderer>>,
}

impl fmt::Debug for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewState")
            .field("id", &self.id)
            .field("records", &self.records.len())
            .field("x", &self.x)
            .field("y", &self.y)
            .field("selection", &self.selection)
            .field("pointer", &self.pointer)
            .field("redraws", &self.redraws)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl ViewState {
    fn axis_length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.config.plot_width(),
            Axis::Y => self.config.plot_height(),
        }
    }

    fn lens_mut(&mut self, axis: Axis) -> &mut DistortionScale {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    fn lens_enabled(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.config.lens.lens_x,
            Axis::Y => self.config.lens.lens_y,
        }
    }

    fn apply_ranges(&mut self) {
        let width = self.config.plot_width();
        let height = self.config.plot_height();
        self.x.set_range_extent([0.0, width]);
        self.y.set_range_extent([height, 0.0]);
    }

    /// Focus one axis on a plot-local coordinate, or release it when the
    /// coordinate falls outside this view.
    fn focus_axis(&mut self, axis: Axis, coordinate: Option<f64>) -> Result<(), LensError> {
        let length = self.axis_length(axis);
        let distortion = self.config.lens.distortion;
        let lens = self.lens_mut(axis);
        match coordinate {
            Some(coordinate) if within_axis(coordinate, length) => {
                lens.engage(coordinate, distortion)?;
            }
            _ => {
                lens.release();
            }
        }
        Ok(())
    }

    fn mirror(&mut self, pointer: &PointerPayload, x: bool, y: bool) -> Result<(), LensError> {
        let mouse = pointer.mouse.map(|[px, py]| ScreenPoint::new(px, py));
        for (axis, enabled) in [(Axis::X, x), (Axis::Y, y)] {
            if enabled {
                self.focus_axis(axis, mouse.map(|point| axis.component(point)))?;
            }
        }
        Ok(())
    }

    fn marks(&self) -> Vec<ProjectedMark> {
        project_records(&self.records, &self.x, &self.y, &self.selection)
    }

    fn frame(&self) -> Frame {
        let count = self.config.tick_count;
        Frame {
            view: self.id.clone(),
            generation: self.redraws,
            marks: self.marks(),
            x_ticks: axis_ticks(&self.x, count),
            y_ticks: axis_ticks(&self.y, count),
            lens_active: !self.x.is_identity() || !self.y.is_identity(),
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        self.redraws += 1;
        let frame = self.frame();
        trace!(view = %self.id, generation = self.redraws, marks = frame.marks.len(), "redraw");
        if let Some(renderer) = self.renderer.as_mut() {
            renderer
                .render(&frame)
                .with_context(|| format!("view {} failed to draw frame {}", self.id, frame.generation))?;
        }
        Ok(())
    }
}

/// Builder for [`LinkedView`].
pub struct LinkedViewBuilder {
    id: ViewId,
    records: Vec<Record>,
    config: ViewConfig,
    x_kind: ScaleKind,
    y_kind: ScaleKind,
    x_domain: Option<Extent>,
    y_domain: Option<Extent>,
    renderer: Option<Box<dyn Renderer>>,
}

impl fmt::Debug for LinkedViewBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedViewBuilder")
            .field("id", &self.id)
            .field("records", &self.records.len())
            .field("config", &self.config)
            .field("x_kind", &self.x_kind)
            .field("y_kind", &self.y_kind)
            .field("x_domain", &self.x_domain)
            .field("y_domain", &self.y_domain)
            .finish_non_exhaustive()
    }
}

impl LinkedViewBuilder {
    /// Records to plot.
    pub fn records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records = records.into_iter().collect();
        self
    }

    /// Layout and lens settings.
    pub fn config(mut self, config: ViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a logarithmic Y axis.
    pub fn log_y(mut self) -> Self {
        self.y_kind = ScaleKind::Log10;
        self
    }

    /// Use a logarithmic X axis.
    pub fn log_x(mut self) -> Self {
        self.x_kind = ScaleKind::Log10;
        self
    }

    /// Fix the X domain instead of deriving it from the records.
    pub fn x_domain(mut self, domain: impl Into<Extent>) -> Self {
        self.x_domain = Some(domain.into());
        self
    }

    /// Fix the Y domain instead of deriving it from the records.
    pub fn y_domain(mut self, domain: impl Into<Extent>) -> Self {
        self.y_domain = Some(domain.into());
        self
    }

    /// Sink receiving one frame per redraw.
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Validate, draw the first frame and attach to `bus`.
    pub fn build(self, bus: &CoordinationBus) -> Result<LinkedView, ViewError> {
        self.config.validate()?;
        if self.id.is_empty() {
            return Err(BusError::EmptySubscriber.into());
        }

        let tick_count = self.config.tick_count;
        let x_domain = self
            .x_domain
            .unwrap_or_else(|| derived_domain(self.x_kind, self.records.iter().map(|r| r.x)));
        let y_domain = self
            .y_domain
            .unwrap_or_else(|| derived_domain(self.y_kind, self.records.iter().map(|r| r.y)));

        let mut x = ContinuousScale::new(self.x_kind, x_domain, [0.0, 1.0])
            .with_round(self.config.round_x);
        let mut y = ContinuousScale::new(self.y_kind, y_domain, [1.0, 0.0]);
        x.nice(tick_count);
        y.nice(tick_count);

        let mut state = ViewState {
            id: self.id.clone(),
            config: self.config,
            records: self.records,
            x: DistortionScale::new(x),
            y: DistortionScale::new(y),
            selection: SelectionState::new(),
            pointer: None,
            redraws: 0,
            renderer: self.renderer,
        };
        state.apply_ranges();
        state.redraw().map_err(ViewError::Render)?;

        let selection_channel = state.config.selection_channel.clone();
        let mut view = LinkedView {
            id: self.id,
            bus: bus.clone(),
            state: Rc::new(RefCell::new(state)),
            bindings: vec![Binding::Selection(selection_channel)],
            attached: false,
        };
        view.attach()?;
        info!(view = %view.id, "linked view ready");
        Ok(view)
    }
}

/// Domain derived from data: `[0, ceil(max)]` for linear axes, the positive
/// data extent for logarithmic ones.
fn derived_domain(kind: ScaleKind, values: impl Iterator<Item = f64>) -> Extent {
    match kind {
        ScaleKind::Linear => Bounds::from_values(values)
            .map_or(Extent::new(0.0, 1.0), |bounds| bounds.zero_to_ceil()),
        ScaleKind::Log10 => Bounds::from_values(values.filter(|value| *value > 0.0))
            .map_or(Extent::new(1.0, 10.0), |bounds| {
                if bounds.min == bounds.max {
                    Extent::new(bounds.min, bounds.min * 10.0)
                } else {
                    Extent::new(bounds.min, bounds.max)
                }
            }),
    }
}

/// One chart view linked to others through a [`CoordinationBus`].
///
/// Dropping the view unsubscribes it.
#[derive(Debug)]
pub struct LinkedView {
    id: ViewId,
    bus: CoordinationBus,
    state: Rc<RefCell<ViewState>>,
    bindings: Vec<Binding>,
    attached: bool,
}

impl LinkedView {
    /// Start building a view identified by `id`.
    pub fn builder(id: impl Into<ViewId>) -> LinkedViewBuilder {
        LinkedViewBuilder {
            id: id.into(),
            records: Vec::new(),
            config: ViewConfig::default(),
            x_kind: ScaleKind::Linear,
            y_kind: ScaleKind::Linear,
            x_domain: None,
            y_domain: None,
            renderer: None,
        }
    }

    /// View identifier, also used as its subscriber id.
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Whether the view currently listens on the bus.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn state_mut(&self) -> Result<RefMut<'_, ViewState>, ViewError> {
        self.state
            .try_borrow_mut()
            .map_err(|_| ViewError::Busy(self.id.clone()))
    }

    fn subscribe(&self, binding: &Binding) -> Result<(), BusError> {
        let state: Weak<RefCell<ViewState>> = Rc::downgrade(&self.state);
        match binding {
            Binding::Selection(channel) => {
                self.bus
                    .subscribe(channel.clone(), &self.id, move |payload: &Payload| {
                        let Some(selection) = payload.as_selection() else {
                            return Ok(());
                        };
                        let Some(shared) = state.upgrade() else {
                            return Ok(());
                        };
                        let mut view = shared
                            .try_borrow_mut()
                            .map_err(|_| anyhow!("view is busy"))?;
                        if view.selection.apply(selection) {
                            view.redraw()?;
                        }
                        Ok(())
                    })
            }
            Binding::Mirror { source, x, y } => {
                let (x, y) = (*x, *y);
                self.bus
                    .subscribe(Channel::pointer(source), &self.id, move |payload: &Payload| {
                        let Some(pointer) = payload.as_pointer() else {
                            return Ok(());
                        };
                        let Some(shared) = state.upgrade() else {
                            return Ok(());
                        };
                        let mut view = shared
                            .try_borrow_mut()
                            .map_err(|_| anyhow!("view is busy"))?;
                        view.mirror(pointer, x, y)?;
                        view.redraw()
                    })
            }
        }
    }

    /// Subscribe every binding. Calling it while attached re-registers the
    /// handlers in place.
    pub fn attach(&mut self) -> Result<(), ViewError> {
        for binding in &self.bindings {
            self.subscribe(binding)?;
        }
        self.attached = true;
        debug!(view = %self.id, bindings = self.bindings.len(), "attached");
        Ok(())
    }

    /// Drop and re-register every handler.
    pub fn rebind(&mut self) -> Result<(), ViewError> {
        for binding in &self.bindings {
            self.bus.unsubscribe(&binding.channel(), &self.id);
            self.subscribe(binding)?;
        }
        self.attached = true;
        Ok(())
    }

    /// Unsubscribe from every channel. Safe to call repeatedly.
    pub fn detach(&mut self) {
        for binding in &self.bindings {
            self.bus.unsubscribe(&binding.channel(), &self.id);
        }
        if self.attached {
            debug!(view = %self.id, "detached");
        }
        self.attached = false;
    }

    /// Focus this view's lens on `axis` wherever the pointer is in `source`.
    pub fn mirror_pointer(&mut self, source: impl Into<ViewId>, axis: Axis) -> Result<(), ViewError> {
        let source = source.into();
        if source.is_empty() {
            return Err(BusError::EmptyChannel.into());
        }
        let position = self.bindings.iter().position(
            |binding| matches!(binding, Binding::Mirror { source: existing, .. } if *existing == source),
        );
        let index = match position {
            Some(index) => index,
            None => {
                self.bindings.push(Binding::Mirror {
                    source: source.clone(),
                    x: false,
                    y: false,
                });
                self.bindings.len() - 1
            }
        };
        if let Binding::Mirror { x, y, .. } = &mut self.bindings[index] {
            match axis {
                Axis::X => *x = true,
                Axis::Y => *y = true,
            }
        }
        if self.attached {
            self.subscribe(&self.bindings[index])?;
        }
        debug!(view = %self.id, %source, ?axis, "mirroring pointer");
        Ok(())
    }

    /// Pointer moved to `point` in the view's outer coordinates.
    ///
    /// Inside the plotting area this focuses the enabled lenses on the
    /// pointer; anywhere else it behaves like [`pointer_leave`](Self::pointer_leave).
    /// The position is published even when this view fails to redraw; the
    /// render error is returned afterwards.
    pub fn pointer_move(&mut self, point: ScreenPoint) -> Result<PublishReport, ViewError> {
        let plot = self.state_mut()?.config.plot_rect();
        let HitRegion::Plot(local) = hit_test(plot, point) else {
            return self.pointer_leave();
        };
        let local = local.point();
        let drawn = {
            let mut view = self.state_mut()?;
            for axis in [Axis::X, Axis::Y] {
                let coordinate = view.lens_enabled(axis).then(|| axis.component(local));
                view.focus_axis(axis, coordinate)?;
            }
            view.pointer = Some(local);
            view.redraw()
        };
        self.publish_pointer(PointerPayload::at(local.x, local.y), drawn)
    }

    /// Pointer left the view: release both lenses.
    pub fn pointer_leave(&mut self) -> Result<PublishReport, ViewError> {
        let drawn = {
            let mut view = self.state_mut()?;
            view.x.release();
            view.y.release();
            view.pointer = None;
            view.redraw()
        };
        self.publish_pointer(PointerPayload::left(), drawn)
    }

    /// Broadcast this view's pointer, then surface its own redraw failure.
    fn publish_pointer(
        &self,
        pointer: PointerPayload,
        drawn: anyhow::Result<()>,
    ) -> Result<PublishReport, ViewError> {
        let report = self
            .bus
            .publish(&Channel::pointer(&self.id), &Payload::from(pointer));
        drawn.map_err(ViewError::Render)?;
        Ok(report)
    }

    /// Change the outer size, keeping lens state and re-binding handlers.
    pub fn resize(&mut self, outer_width: f64, outer_height: f64) -> Result<(), ViewError> {
        {
            let mut view = self.state_mut()?;
            let resized = view.config.clone().with_size(outer_width, outer_height);
            resized.validate()?;
            view.config = resized;
            view.apply_ranges();
            debug!(view = %self.id, outer_width, outer_height, "resized");
        }
        if self.attached {
            self.rebind()?;
        }
        self.state_mut()?.redraw().map_err(ViewError::Render)
    }

    /// Marks as they would be drawn now.
    pub fn project(&self) -> Vec<ProjectedMark> {
        self.state.borrow().marks()
    }

    /// Full frame as it would be drawn now.
    pub fn frame(&self) -> Frame {
        self.state.borrow().frame()
    }

    /// Redraw passes so far, including the initial one.
    pub fn redraws(&self) -> u64 {
        self.state.borrow().redraws
    }

    /// Latest hover/selection received from the bus.
    pub fn selection(&self) -> SelectionState {
        self.state.borrow().selection.clone()
    }

    /// Emphasis of a category under the current selection.
    pub fn emphasis(&self, category: &CategoryId) -> Emphasis {
        self.state.borrow().selection.emphasis(category)
    }

    /// Last pointer position in plot-local pixels, if the pointer is inside.
    pub fn pointer(&self) -> Option<ScreenPoint> {
        self.state.borrow().pointer
    }

    /// Current X scale, lens included.
    pub fn x_scale(&self) -> DistortionScale {
        self.state.borrow().x.clone()
    }

    /// Current Y scale, lens included.
    pub fn y_scale(&self) -> DistortionScale {
        self.state.borrow().y.clone()
    }

    /// Current configuration.
    pub fn config(&self) -> ViewConfig {
        self.state.borrow().config.clone()
    }
}

impl Drop for LinkedView {
    fn drop(&mut self) {
        self.detach();
    }
}

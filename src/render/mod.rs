//! Backend-agnostic frames handed to renderers.
//!
//! A linked view never draws. Each redraw pass builds a [`Frame`] of
//! positioned, emphasis-tagged marks plus axis ticks and hands it to the
//! view's [`Renderer`], which owns whatever SVG, canvas, or terminal output
//! the host uses.

use serde::{Deserialize, Serialize};

use crate::bus::ViewId;
use crate::record::{CategoryId, Record};
use crate::scale::Scale;
use crate::selection::{Emphasis, SelectionState};

/// One datum positioned in plot-local pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMark {
    /// Index of the source record.
    pub index: usize,
    /// X position in pixels.
    pub x: f64,
    /// Y position in pixels.
    pub y: f64,
    /// Category of the source record.
    pub category: CategoryId,
    /// Highlight state derived from the current hover/selection.
    pub emphasis: Emphasis,
}

/// An axis tick: its domain value and its (possibly distorted) pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Domain value.
    pub value: f64,
    /// Position in plot-local pixels.
    pub position: f64,
}

/// Everything a renderer needs for one redraw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// View that produced the frame.
    pub view: ViewId,
    /// Redraw counter at the time the frame was built.
    pub generation: u64,
    /// Marks in record order. Records that do not map to finite pixels are skipped.
    pub marks: Vec<ProjectedMark>,
    /// X axis ticks.
    pub x_ticks: Vec<AxisTick>,
    /// Y axis ticks.
    pub y_ticks: Vec<AxisTick>,
    /// Whether a fisheye lens currently warps either axis.
    pub lens_active: bool,
}

impl Frame {
    /// Marks currently emphasized.
    pub fn emphasized(&self) -> impl Iterator<Item = &ProjectedMark> {
        self.marks
            .iter()
            .filter(|mark| mark.emphasis.is_emphasized())
    }
}

/// Sink for frames produced by a linked view.
///
/// An error fails only the redraw that produced it; linked views keep
/// receiving events.
pub trait Renderer {
    /// Draw one frame.
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()>;
}

impl<F> Renderer for F
where
    F: FnMut(&Frame) -> anyhow::Result<()>,
{
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self(frame)
    }
}

/// Position every record through the given scales.
pub fn project_records<X, Y>(
    records: &[Record],
    x_scale: &X,
    y_scale: &Y,
    selection: &SelectionState,
) -> Vec<ProjectedMark>
where
    X: Scale + ?Sized,
    Y: Scale + ?Sized,
{
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let x = x_scale.map(record.x);
            let y = y_scale.map(record.y);
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            Some(ProjectedMark {
                index,
                x,
                y,
                category: record.category.clone(),
                emphasis: selection.emphasis(&record.category),
            })
        })
        .collect()
}

/// Ticks of a scale, positioned through that same scale.
pub fn axis_ticks<S: Scale + ?Sized>(scale: &S, count: usize) -> Vec<AxisTick> {
    scale
        .ticks(count)
        .into_iter()
        .map(|value| AxisTick {
            value,
            position: scale.map(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SelectionPayload;
    use crate::lens::DistortionScale;
    use crate::scale::ContinuousScale;

    #[test]
    fn projection_tags_emphasis_and_skips_unmappable() {
        let x = ContinuousScale::linear([0.0, 10.0], [0.0, 100.0]);
        let y = ContinuousScale::log10([1.0, 100.0], [200.0, 0.0]);
        let records = vec![
            Record::new(1.0, 10.0, "smoking"),
            Record::new(2.0, 0.0, "diet"),
            Record::new(3.0, 100.0, "diet"),
        ];
        let mut selection = SelectionState::new();
        selection.apply(&SelectionPayload::new(None, ["smoking"]));

        let marks = project_records(&records, &x, &y, &selection);
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].index, 0);
        assert_eq!(marks[0].emphasis, Emphasis::Emphasized);
        assert_eq!(marks[1].index, 2);
        assert_eq!(marks[1].y, 0.0);
        assert_eq!(marks[1].emphasis, Emphasis::Suppressed);
    }

    #[test]
    fn distorted_ticks_spread_around_focus() {
        let mut lens = DistortionScale::new(ContinuousScale::linear([0.0, 100.0], [0.0, 500.0]));
        lens.engage(250.0, 3.0).unwrap();
        let ticks = axis_ticks(&lens, 10);
        let plain = axis_ticks(lens.base(), 10);
        assert_eq!(ticks.len(), plain.len());
        let near = ticks.iter().find(|tick| tick.value == 60.0).unwrap();
        assert!(near.position > 300.0);
        assert_eq!(ticks.first().map(|tick| tick.position), Some(0.0));
        assert_eq!(ticks.last().map(|tick| tick.position), Some(500.0));
    }

    #[test]
    fn closures_act_as_renderers() {
        let mut seen = Vec::new();
        let mut renderer = |frame: &Frame| {
            seen.push(frame.generation);
            Ok::<(), anyhow::Error>(())
        };
        let frame = Frame {
            view: ViewId::new("v"),
            generation: 7,
            marks: Vec::new(),
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
            lens_active: false,
        };
        renderer.render(&frame).unwrap();
        renderer.render(&frame).unwrap();
        assert_eq!(seen, [7, 7]);
    }
}

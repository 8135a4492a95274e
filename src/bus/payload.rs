use serde::{Deserialize, Serialize};

use crate::record::CategoryId;

/// Hover and multi-select state broadcast by a filter widget.
///
/// `selected` keeps insertion order and never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionPayload {
    /// Category under the pointer, if any.
    pub hovered: Option<CategoryId>,
    /// Selected categories in the order they were picked.
    pub selected: Vec<CategoryId>,
}

impl SelectionPayload {
    /// Create a payload, dropping repeated selections after their first occurrence.
    pub fn new<I, T>(hovered: Option<CategoryId>, selected: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CategoryId>,
    {
        let mut unique: Vec<CategoryId> = Vec::new();
        for id in selected {
            let id = id.into();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self {
            hovered,
            selected: unique,
        }
    }

    /// Payload with no hover and no selection.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Payload carrying only a hover.
    pub fn hovering(id: impl Into<CategoryId>) -> Self {
        Self {
            hovered: Some(id.into()),
            selected: Vec::new(),
        }
    }
}

/// Pointer position inside a view's plotting area, in plot-local pixels.
///
/// `mouse: None` means the pointer left the interactive region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPayload {
    /// `[x, y]` position, or `None` after the pointer left.
    pub mouse: Option<[f64; 2]>,
}

impl PointerPayload {
    /// Pointer at a position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            mouse: Some([x, y]),
        }
    }

    /// Pointer left the region.
    pub fn left() -> Self {
        Self { mouse: None }
    }
}

/// Any payload carried by the default bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Category or variable hover/selection.
    Selection(SelectionPayload),
    /// Pointer movement.
    Pointer(PointerPayload),
}

impl Payload {
    /// Access the selection payload, if this is one.
    pub fn as_selection(&self) -> Option<&SelectionPayload> {
        match self {
            Self::Selection(selection) => Some(selection),
            Self::Pointer(_) => None,
        }
    }

    /// Access the pointer payload, if this is one.
    pub fn as_pointer(&self) -> Option<&PointerPayload> {
        match self {
            Self::Pointer(pointer) => Some(pointer),
            Self::Selection(_) => None,
        }
    }
}

impl From<SelectionPayload> for Payload {
    fn from(selection: SelectionPayload) -> Self {
        Self::Selection(selection)
    }
}

impl From<PointerPayload> for Payload {
    fn from(pointer: PointerPayload) -> Self {
        Self::Pointer(pointer)
    }
}

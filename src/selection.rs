//! Hover/selection reconciliation shared by every linked view.
//!
//! Views never read each other's state. Each keeps its own
//! [`SelectionState`], overwritten by the latest [`SelectionPayload`] received
//! from the bus, and derives a two-valued [`Emphasis`] per datum from it.
//! Applying the same payload twice leaves the state unchanged.

use serde::{Deserialize, Serialize};

use crate::bus::SelectionPayload;
use crate::record::CategoryId;

/// Highlight state of one datum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emphasis {
    /// Drawn at full strength.
    Emphasized,
    /// Faded or hidden because something else is hovered or selected.
    Suppressed,
}

impl Emphasis {
    /// Check whether this is [`Emphasis::Emphasized`].
    pub fn is_emphasized(self) -> bool {
        matches!(self, Self::Emphasized)
    }
}

/// A view's local copy of the broadcast hover/selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    hovered: Option<CategoryId>,
    selected: Vec<CategoryId>,
    revision: u64,
}

impl SelectionState {
    /// Create an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace local state with a received payload.
    ///
    /// Returns `true` when the state actually changed.
    pub fn apply(&mut self, payload: &SelectionPayload) -> bool {
        if self.hovered == payload.hovered && self.selected == payload.selected {
            return false;
        }
        self.hovered = payload.hovered.clone();
        self.selected = payload.selected.clone();
        self.revision = self.revision.wrapping_add(1);
        true
    }

    /// Currently hovered category.
    pub fn hovered(&self) -> Option<&CategoryId> {
        self.hovered.as_ref()
    }

    /// Currently selected categories, in selection order.
    pub fn selected(&self) -> &[CategoryId] {
        &self.selected
    }

    /// Change counter, bumped whenever [`apply`](Self::apply) alters the state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check whether neither a hover nor a selection is active.
    pub fn is_idle(&self) -> bool {
        self.hovered.is_none() && self.selected.is_empty()
    }

    /// Check whether `category` is hovered or selected.
    pub fn emphasized(&self, category: &CategoryId) -> bool {
        self.hovered.as_ref() == Some(category) || self.selected.contains(category)
    }

    /// Check whether `category` should be faded.
    ///
    /// Nothing is suppressed while the state is idle.
    pub fn suppressed(&self, category: &CategoryId) -> bool {
        !self.is_idle() && !self.emphasized(category)
    }

    /// Two-valued highlight for `category`.
    pub fn emphasis(&self, category: &CategoryId) -> Emphasis {
        if self.suppressed(category) {
            Emphasis::Suppressed
        } else {
            Emphasis::Emphasized
        }
    }
}

/// Toggle membership of `id`, appending new entries. Returns true if added.
pub(crate) fn toggle(selected: &mut Vec<CategoryId>, id: &CategoryId) -> bool {
    if let Some(index) = selected.iter().position(|existing| existing == id) {
        selected.remove(index);
        false
    } else {
        selected.push(id.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> CategoryId {
        CategoryId::new(name)
    }

    #[test]
    fn idle_state_suppresses_nothing() {
        let state = SelectionState::new();
        assert!(state.is_idle());
        assert!(!state.suppressed(&id("smoking")));
        assert_eq!(state.emphasis(&id("diet")), Emphasis::Emphasized);
    }

    #[test]
    fn hover_emphasizes_only_hovered() {
        let mut state = SelectionState::new();
        state.apply(&SelectionPayload::hovering("smoking"));
        assert!(state.emphasized(&id("smoking")));
        assert!(!state.emphasized(&id("diet")));
        assert!(state.suppressed(&id("diet")));
        assert_eq!(state.emphasis(&id("smoking")), Emphasis::Emphasized);
    }

    #[test]
    fn hover_and_selection_combine() {
        let mut state = SelectionState::new();
        state.apply(&SelectionPayload::new(Some(id("sleep")), ["diet", "alcohol"]));
        for name in ["sleep", "diet", "alcohol"] {
            assert_eq!(state.emphasis(&id(name)), Emphasis::Emphasized);
        }
        assert_eq!(state.emphasis(&id("smoking")), Emphasis::Suppressed);
        assert_eq!(state.selected(), [id("diet"), id("alcohol")]);
    }

    #[test]
    fn reapplying_same_payload_is_idempotent() {
        let mut state = SelectionState::new();
        let payload = SelectionPayload::new(None, ["diet"]);
        assert!(state.apply(&payload));
        let snapshot = state.clone();
        assert!(!state.apply(&payload));
        assert_eq!(state, snapshot);
        assert!(state.apply(&SelectionPayload::idle()));
        assert!(state.is_idle());
    }

    #[test]
    fn toggle_preserves_insertion_order() {
        let mut selected = Vec::new();
        assert!(toggle(&mut selected, &id("a")));
        assert!(toggle(&mut selected, &id("b")));
        assert!(toggle(&mut selected, &id("c")));
        assert!(!toggle(&mut selected, &id("b")));
        assert_eq!(selected, [id("a"), id("c")]);
    }
}

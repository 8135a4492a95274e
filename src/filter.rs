//! Category and variable filter widgets.
//!
//! Filters own their hover/selection and broadcast it on every gesture. They
//! never draw; hosts read [`CategoryFilter::swatch_filled`] or
//! [`VariableFilter::row_hidden`] to style their rows.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::debug;

use crate::bus::{
    BusError, Channel, CoordinationBus, Payload, PublishReport, SelectionPayload, ViewId,
};
use crate::record::CategoryId;
use crate::selection::{self, SelectionState};

/// Hover and insertion-ordered multi-select over a fixed set of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Picker {
    hovered: Option<CategoryId>,
    selected: Vec<CategoryId>,
}

impl Picker {
    fn payload(&self) -> SelectionPayload {
        SelectionPayload {
            hovered: self.hovered.clone(),
            selected: self.selected.clone(),
        }
    }
}

/// Category legend that broadcasts on [`Channel::CategoryState`].
#[derive(Debug)]
pub struct CategoryFilter {
    id: ViewId,
    categories: Vec<CategoryId>,
    picker: Picker,
    bus: CoordinationBus,
}

impl CategoryFilter {
    /// Create a filter over `categories` publishing on `bus`.
    pub fn new<I, T>(id: impl Into<ViewId>, categories: I, bus: &CoordinationBus) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CategoryId>,
    {
        let mut unique: Vec<CategoryId> = Vec::new();
        for category in categories {
            let category = category.into();
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self {
            id: id.into(),
            categories: unique,
            picker: Picker::default(),
            bus: bus.clone(),
        }
    }

    /// Filter identifier.
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// Hovered category.
    pub fn hovered(&self) -> Option<&CategoryId> {
        self.picker.hovered.as_ref()
    }

    /// Selected categories in click order.
    pub fn selected(&self) -> &[CategoryId] {
        &self.picker.selected
    }

    /// Current broadcast state.
    pub fn payload(&self) -> SelectionPayload {
        self.picker.payload()
    }

    /// Toggle a category. Unknown categories are ignored and nothing is published.
    pub fn click(&mut self, category: &CategoryId) -> Option<PublishReport> {
        if !self.categories.contains(category) {
            return None;
        }
        let added = selection::toggle(&mut self.picker.selected, category);
        debug!(filter = %self.id, %category, added, "category toggled");
        Some(self.publish())
    }

    /// Pointer entered a category row.
    pub fn enter(&mut self, category: &CategoryId) -> Option<PublishReport> {
        if !self.categories.contains(category) {
            return None;
        }
        self.picker.hovered = Some(category.clone());
        Some(self.publish())
    }

    /// Pointer left the hovered row.
    pub fn leave(&mut self) -> PublishReport {
        self.picker.hovered = None;
        self.publish()
    }

    /// Whether a category's swatch is drawn filled.
    ///
    /// All swatches are filled until something is selected; after that only
    /// selected ones are.
    pub fn swatch_filled(&self, category: &CategoryId) -> bool {
        self.picker.selected.is_empty() || self.picker.selected.contains(category)
    }

    /// Broadcast the current state again.
    pub fn publish(&self) -> PublishReport {
        self.bus
            .publish(&Channel::CategoryState, &Payload::from(self.payload()))
    }
}

/// Variable list linked to the category filter.
///
/// Each variable belongs to one category. The list broadcasts its own
/// hover/selection on [`Channel::VariableState`] and hides rows whose category
/// is suppressed by the latest category broadcast.
#[derive(Debug)]
pub struct VariableFilter {
    id: ViewId,
    variables: IndexMap<CategoryId, CategoryId>,
    picker: Picker,
    categories: Rc<RefCell<SelectionState>>,
    bus: CoordinationBus,
}

impl VariableFilter {
    /// Create a variable list from `(variable, category)` pairs and subscribe
    /// it to category broadcasts.
    pub fn new<I, V, C>(
        id: impl Into<ViewId>,
        variables: I,
        bus: &CoordinationBus,
    ) -> Result<Self, BusError>
    where
        I: IntoIterator<Item = (V, C)>,
        V: Into<CategoryId>,
        C: Into<CategoryId>,
    {
        let filter = Self {
            id: id.into(),
            variables: variables
                .into_iter()
                .map(|(variable, category)| (variable.into(), category.into()))
                .collect(),
            picker: Picker::default(),
            categories: Rc::new(RefCell::new(SelectionState::new())),
            bus: bus.clone(),
        };
        filter.bind()?;
        Ok(filter)
    }

    fn bind(&self) -> Result<(), BusError> {
        let state: Weak<RefCell<SelectionState>> = Rc::downgrade(&self.categories);
        self.bus
            .subscribe(Channel::CategoryState, &self.id, move |payload: &Payload| {
                let (Some(state), Some(selection)) = (state.upgrade(), payload.as_selection())
                else {
                    return Ok(());
                };
                state.borrow_mut().apply(selection);
                Ok(())
            })
    }

    /// Filter identifier.
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Variables in display order.
    pub fn variables(&self) -> impl Iterator<Item = &CategoryId> {
        self.variables.keys()
    }

    /// Category owning `variable`.
    pub fn category_of(&self, variable: &CategoryId) -> Option<&CategoryId> {
        self.variables.get(variable)
    }

    /// Latest category state received from the bus.
    pub fn category_state(&self) -> SelectionState {
        self.categories.borrow().clone()
    }

    /// Hovered variable.
    pub fn hovered(&self) -> Option<&CategoryId> {
        self.picker.hovered.as_ref()
    }

    /// Selected variables in click order.
    pub fn selected(&self) -> &[CategoryId] {
        &self.picker.selected
    }

    /// Current broadcast state.
    pub fn payload(&self) -> SelectionPayload {
        self.picker.payload()
    }

    /// Whether the row for `variable` is hidden by the category filter.
    pub fn row_hidden(&self, variable: &CategoryId) -> bool {
        self.variables
            .get(variable)
            .is_some_and(|category| self.categories.borrow().suppressed(category))
    }

    /// Variables whose rows are currently shown.
    pub fn visible_rows(&self) -> Vec<&CategoryId> {
        self.variables
            .keys()
            .filter(|variable| !self.row_hidden(variable))
            .collect()
    }

    /// Toggle a variable. Unknown variables are ignored.
    pub fn click(&mut self, variable: &CategoryId) -> Option<PublishReport> {
        if !self.variables.contains_key(variable) {
            return None;
        }
        let added = selection::toggle(&mut self.picker.selected, variable);
        debug!(filter = %self.id, %variable, added, "variable toggled");
        Some(self.publish())
    }

    /// Pointer entered a variable row.
    pub fn enter(&mut self, variable: &CategoryId) -> Option<PublishReport> {
        if !self.variables.contains_key(variable) {
            return None;
        }
        self.picker.hovered = Some(variable.clone());
        Some(self.publish())
    }

    /// Pointer left the hovered row.
    pub fn leave(&mut self) -> PublishReport {
        self.picker.hovered = None;
        self.publish()
    }

    /// Broadcast the current state again.
    pub fn publish(&self) -> PublishReport {
        self.bus
            .publish(&Channel::VariableState, &Payload::from(self.payload()))
    }

    /// Re-register the category handler, replacing the previous one.
    pub fn rebind(&self) -> Result<(), BusError> {
        self.bus.unsubscribe(&Channel::CategoryState, &self.id);
        self.bind()
    }

    /// Stop listening for category broadcasts. Safe to call repeatedly.
    pub fn detach(&self) {
        self.bus.unsubscribe(&Channel::CategoryState, &self.id);
    }
}

impl Drop for VariableFilter {
    fn drop(&mut self) {
        self.detach();
    }
}

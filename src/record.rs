//! Input records consumed by linked views.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extent::Bounds;

/// Identifier of a category (or variable) used for cross-view highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Create a category identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label for display, with underscores shown as spaces.
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for CategoryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CategoryId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CategoryId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One plotted datum: a position and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
    /// Owning category.
    pub category: CategoryId,
}

impl Record {
    /// Create a record.
    pub fn new(x: f64, y: f64, category: impl Into<CategoryId>) -> Self {
        Self {
            x,
            y,
            category: category.into(),
        }
    }
}

/// Bounds of the finite X values.
pub fn x_bounds(records: &[Record]) -> Option<Bounds> {
    Bounds::from_values(records.iter().map(|record| record.x))
}

/// Bounds of the finite Y values.
pub fn y_bounds(records: &[Record]) -> Option<Bounds> {
    Bounds::from_values(records.iter().map(|record| record.y))
}

/// Distinct categories in first-seen order.
pub fn categories(records: &[Record]) -> Vec<CategoryId> {
    let mut seen: Vec<CategoryId> = Vec::new();
    for record in records {
        if !seen.contains(&record.category) {
            seen.push(record.category.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_keep_first_seen_order() {
        let records = vec![
            Record::new(1.0, 2.0, "smoking"),
            Record::new(2.0, 1.0, "diet"),
            Record::new(3.0, 0.5, "smoking"),
            Record::new(0.5, 4.0, "sleep"),
        ];
        let found = categories(&records);
        let ids: Vec<&str> = found.iter().map(CategoryId::as_str).collect();
        assert_eq!(ids, ["smoking", "diet", "sleep"]);
    }

    #[test]
    fn bounds_cover_records() {
        let records = vec![
            Record::new(1.0, f64::NAN, "a"),
            Record::new(4.0, 2.0, "b"),
        ];
        assert_eq!(x_bounds(&records), Some(Bounds::new(1.0, 4.0)));
        assert_eq!(y_bounds(&records), Some(Bounds::new(2.0, 2.0)));
        assert_eq!(x_bounds(&[]), None);
    }

    #[test]
    fn label_replaces_underscores() {
        assert_eq!(CategoryId::new("physical_activity").label(), "physical activity");
    }
}

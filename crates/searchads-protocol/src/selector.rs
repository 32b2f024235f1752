//! Selector descriptors sent to search-style (`/find`) endpoints

use serde::{Deserialize, Serialize};

/// A declarative filter/sort/paginate descriptor.
///
/// Everything except [`Selector::pagination`] is opaque to the client; the
/// pagination engine only ever replaces that field on its own copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Filter conditions, all of which must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Restrict the returned fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    /// Sort specification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Sorting>,

    /// Page window; `None` lets the server pick its default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a returned field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Add a sort key.
    pub fn with_order_by(mut self, sorting: Sorting) -> Self {
        self.order_by.push(sorting);
        self
    }

    /// Set the page window.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// A single filter condition in a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Field name the condition applies to
    pub field: String,
    /// Operator such as `EQUALS`, `IN`, `CONTAINS`
    pub operator: String,
    /// Operand values
    pub values: Vec<String>,
}

impl Condition {
    /// Create a condition.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// A sort key in a [`Selector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    /// Field to sort on
    pub field: String,
    /// Direction
    pub sort_order: SortOrder,
}

impl Sorting {
    /// Create a sort key.
    pub fn new(field: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            field: field.into(),
            sort_order,
        }
    }
}

/// Offset-based page window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Zero-based index of the first item
    pub offset: i64,
    /// Maximum number of items to return
    pub limit: i64,
}

impl Pagination {
    /// Create a page window.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }
}

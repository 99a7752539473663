//! Column descriptors and renderable cells

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Fields, Result, TabulaError, Value};

/// Data type of a column, drives default formatting and layout decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDataType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
    Currency,
    Status,
    Actions,
}

/// Badge colors used for status cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
    Primary,
}

/// A row-level action offered by an actions column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
}

impl Action {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Renderable representation of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing to show
    Empty,
    /// Plain text
    Text(String),
    /// Colored label
    Badge { label: String, color: BadgeColor },
    /// Row actions
    Actions(Vec<Action>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Badge { label, .. } => label.is_empty(),
            Cell::Actions(actions) => actions.is_empty(),
        }
    }

    /// Plain text view of the cell, used by card layouts and clipboard copies
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Badge { label, .. } => label.clone(),
            Cell::Actions(actions) => actions
                .iter()
                .map(|a| a.label.as_str())
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// Custom renderer, receives the raw value and the whole record
pub type CustomRender = Arc<dyn Fn(&Value, &dyn Fields) -> Cell + Send + Sync>;

/// Custom value formatter, receives the raw value only
pub type CustomFormat = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Static metadata describing one displayable field of a record
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Key into the record, unique within a column set
    pub field: String,
    pub label: String,
    pub data_type: ColumnDataType,
    pub sortable: bool,
    pub filterable: bool,
    pub hidden: bool,
    /// Preferred width in pixels
    pub width: Option<u32>,
    pub custom_render: Option<CustomRender>,
    pub custom_format: Option<CustomFormat>,
    /// Lookup group for status badges. Required iff `data_type` is `Status`.
    pub status_group: Option<String>,
}

impl std::fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("data_type", &self.data_type)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("hidden", &self.hidden)
            .field("width", &self.width)
            .field("custom_render", &self.custom_render.is_some())
            .field("custom_format", &self.custom_format.is_some())
            .field("status_group", &self.status_group)
            .finish()
    }
}

impl ColumnDescriptor {
    /// Create a visible column. Every type except `Actions` is sortable by default.
    pub fn new(field: impl Into<String>, label: impl Into<String>, data_type: ColumnDataType) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            data_type,
            sortable: data_type != ColumnDataType::Actions,
            filterable: false,
            hidden: false,
            width: None,
            custom_render: None,
            custom_format: None,
            status_group: None,
        }
    }

    pub fn text(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::String)
    }

    pub fn number(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::Number)
    }

    pub fn date(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::Date)
    }

    pub fn boolean(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::Boolean)
    }

    pub fn currency(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::Currency)
    }

    pub fn status(
        field: impl Into<String>,
        label: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self::new(field, label, ColumnDataType::Status).status_group(group)
    }

    pub fn actions(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field, label, ColumnDataType::Actions)
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn status_group(mut self, group: impl Into<String>) -> Self {
        self.status_group = Some(group.into());
        self
    }

    pub fn render_with(
        mut self,
        render: impl Fn(&Value, &dyn Fields) -> Cell + Send + Sync + 'static,
    ) -> Self {
        self.custom_render = Some(Arc::new(render));
        self
    }

    pub fn format_with(mut self, format: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.custom_format = Some(Arc::new(format));
        self
    }

    pub fn is_actions(&self) -> bool {
        self.data_type == ColumnDataType::Actions
    }
}

/// Check the column set invariants: unique fields and `status_group` present
/// exactly on status columns.
pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.field.as_str()) {
            return Err(TabulaError::DuplicateColumn(column.field.clone()));
        }
        let has_group = column
            .status_group
            .as_deref()
            .is_some_and(|g| !g.trim().is_empty());
        match (column.data_type == ColumnDataType::Status, has_group) {
            (true, false) => return Err(TabulaError::MissingStatusGroup(column.field.clone())),
            (false, true) => {
                return Err(TabulaError::UnexpectedStatusGroup(column.field.clone()));
            }
            _ => {}
        }
    }
    Ok(())
}

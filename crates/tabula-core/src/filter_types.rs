//! Filter and sort types
//!
//! Shared data structures for the filter model, filter configuration and the
//! single-column sort spec.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Result, TabulaError};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    #[default]
    Equals,
    In,
    Between,
    GreaterOrEqual,
    LessOrEqual,
}

/// Value of a filter entry. The variant depends on the filter control kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    List(Vec<String>),
    DateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    NumberRange {
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Empty values are never stored in a filter model
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Number(n) => n.is_nan(),
            FilterValue::Date(_) | FilterValue::Bool(_) => false,
            FilterValue::List(items) => items.is_empty(),
            FilterValue::DateRange { start, end } => start.is_none() && end.is_none(),
            FilterValue::NumberRange { min, max } => {
                min.is_none_or(|v| v.is_nan()) && max.is_none_or(|v| v.is_nan())
            }
        }
    }

    /// Short name of the variant, used in log output
    pub fn kind_name(&self) -> &'static str {
        match self {
            FilterValue::Text(_) => "text",
            FilterValue::Number(_) => "number",
            FilterValue::Date(_) => "date",
            FilterValue::Bool(_) => "bool",
            FilterValue::List(_) => "list",
            FilterValue::DateRange { .. } => "date-range",
            FilterValue::NumberRange { .. } => "number-range",
        }
    }
}

/// One active constraint keyed by filter id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterEntry {
    pub filter_id: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterEntry {
    pub fn new(filter_id: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            filter_id: filter_id.into(),
            operator,
            value,
        }
    }
}

/// Option of a select or multi-select filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of filter control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterKind {
    Text,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Date,
    DateRange,
    /// A number input, or a range control when either bound is configured
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Boolean,
}

impl FilterKind {
    /// Operator used when a control produces a value
    pub fn default_operator(&self) -> FilterOperator {
        match self {
            FilterKind::Text => FilterOperator::Contains,
            FilterKind::Select { .. } | FilterKind::Boolean => FilterOperator::Equals,
            FilterKind::MultiSelect { .. } => FilterOperator::In,
            FilterKind::Date => FilterOperator::GreaterOrEqual,
            FilterKind::DateRange => FilterOperator::Between,
            FilterKind::Number { .. } if self.is_range() => FilterOperator::Between,
            FilterKind::Number { .. } => FilterOperator::Equals,
        }
    }

    /// Range controls produce a single entry holding a pair
    pub fn is_range(&self) -> bool {
        match self {
            FilterKind::DateRange => true,
            FilterKind::Number { min, max } => min.is_some() || max.is_some(),
            _ => false,
        }
    }

    /// Free-text input commits through a debounce timer
    pub fn is_debounced(&self) -> bool {
        matches!(self, FilterKind::Text)
    }

    /// Whether a value has the shape this control produces. Numbers and
    /// range bounds must be finite.
    pub fn accepts(&self, value: &FilterValue) -> bool {
        match (self, value) {
            (FilterKind::Text, FilterValue::Text(_)) => true,
            (FilterKind::Select { .. }, FilterValue::Text(_)) => true,
            (FilterKind::MultiSelect { .. }, FilterValue::List(_)) => true,
            (FilterKind::Date, FilterValue::Date(_)) => true,
            (FilterKind::DateRange, FilterValue::DateRange { .. }) => true,
            (FilterKind::Number { .. }, FilterValue::NumberRange { min, max }) => {
                self.is_range() && min.is_none_or(f64::is_finite) && max.is_none_or(f64::is_finite)
            }
            (FilterKind::Number { .. }, FilterValue::Number(n)) => !self.is_range() && n.is_finite(),
            (FilterKind::Boolean, FilterValue::Bool(_)) => true,
            _ => false,
        }
    }
}

/// Static configuration of one filter control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Filter id, also the key used in shareable links
    pub id: String,
    pub label: String,
    /// Record field the filter applies to
    pub field: String,
    #[serde(flatten)]
    pub kind: FilterKind,
    #[serde(default)]
    pub placeholder: Option<String>,
}

impl FilterConfig {
    /// Create a filter whose id doubles as the target field
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        let id = id.into();
        Self {
            field: id.clone(),
            id,
            label: label.into(),
            kind,
            placeholder: None,
        }
    }

    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Text)
    }

    pub fn select(id: impl Into<String>, label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(id, label, FilterKind::Select { options })
    }

    pub fn multi_select(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(id, label, FilterKind::MultiSelect { options })
    }

    pub fn date(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Date)
    }

    pub fn date_range(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::DateRange)
    }

    pub fn number(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Number { min: None, max: None })
    }

    pub fn number_range(
        id: impl Into<String>,
        label: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self::new(id, label, FilterKind::Number { min, max })
    }

    pub fn boolean(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(id, label, FilterKind::Boolean)
    }

    /// Point the filter at a record field other than its id
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_operator(&self) -> FilterOperator {
        self.kind.default_operator()
    }
}

/// Check filter configuration: unique ids, non-empty fields, sane number bounds.
pub fn validate_filters(configs: &[FilterConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for config in configs {
        if config.id.trim().is_empty() {
            return Err(TabulaError::InvalidFilter {
                id: config.id.clone(),
                reason: "filter id must not be empty".to_string(),
            });
        }
        if !seen.insert(config.id.as_str()) {
            return Err(TabulaError::DuplicateFilter(config.id.clone()));
        }
        if config.field.trim().is_empty() {
            return Err(TabulaError::InvalidFilter {
                id: config.id.clone(),
                reason: "target field must not be empty".to_string(),
            });
        }
        if let FilterKind::Number {
            min: Some(min),
            max: Some(max),
        } = config.kind
            && min > max
        {
            return Err(TabulaError::InvalidFilter {
                id: config.id.clone(),
                reason: format!("min bound {} is greater than max bound {}", min, max),
            });
        }
    }
    Ok(())
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The single active sort
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Where NULL values land when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPosition {
    /// NULL values appear first
    First,
    /// NULL values appear last
    #[default]
    Last,
}

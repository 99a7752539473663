//! Client-side filter evaluation
//!
//! Used in client-paged mode, where the grid holds the whole record set and
//! filters it locally. Server-paged hosts receive the entries instead.
//!
//! Text matching is case-insensitive. A record that lacks the filter's target
//! field, or holds null there, never matches.

use std::cmp::Ordering;

use chrono::NaiveDate;
use tabula_core::{Fields, FilterEntry, FilterOperator, FilterValue, Value};

use crate::FilterModel;

/// Indices of `records` that match every applied entry of `model`
pub fn filtered_indices<R: Fields>(records: &[R], model: &FilterModel) -> Vec<usize> {
    if model.is_empty() {
        return (0..records.len()).collect();
    }
    let entries = model.entries();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record_matches(*record, &entries, model))
        .map(|(idx, _)| idx)
        .collect()
}

/// Check a record against a set of entries (AND semantics)
pub fn record_matches<R: Fields + ?Sized>(
    record: &R,
    entries: &[FilterEntry],
    model: &FilterModel,
) -> bool {
    entries.iter().all(|entry| {
        let field = model
            .config(&entry.filter_id)
            .map(|config| config.field.as_str())
            .unwrap_or(entry.filter_id.as_str());
        match record.field(field) {
            Some(value) => evaluate(entry, &value),
            None => false,
        }
    })
}

/// Evaluate one entry against a field value
pub fn evaluate(entry: &FilterEntry, value: &Value) -> bool {
    if value.is_null() {
        return false;
    }
    // Array cells match when any element does
    if let Value::Array(items) = value {
        return items.iter().any(|item| evaluate(entry, item));
    }

    match &entry.value {
        FilterValue::Text(text) => evaluate_text(entry.operator, value, text),
        FilterValue::Number(n) => value
            .as_f64()
            .is_some_and(|v| compare_with(entry.operator, v.partial_cmp(n))),
        FilterValue::Date(d) => value
            .as_date()
            .is_some_and(|v| compare_with(entry.operator, Some(v.cmp(d)))),
        FilterValue::Bool(b) => value.as_bool() == Some(*b),
        FilterValue::List(items) => {
            let cell = value.to_string().to_lowercase();
            match entry.operator {
                FilterOperator::Contains => items
                    .iter()
                    .any(|item| cell.contains(&item.to_lowercase())),
                _ => items.iter().any(|item| item.to_lowercase() == cell),
            }
        }
        FilterValue::DateRange { start, end } => value
            .as_date()
            .is_some_and(|v| within_dates(v, *start, *end)),
        FilterValue::NumberRange { min, max } => value.as_f64().is_some_and(|v| {
            min.is_none_or(|min| v >= min) && max.is_none_or(|max| v <= max)
        }),
    }
}

fn evaluate_text(operator: FilterOperator, value: &Value, text: &str) -> bool {
    let cell = value.to_string();
    match operator {
        FilterOperator::Contains => cell.to_lowercase().contains(&text.to_lowercase()),
        FilterOperator::Equals | FilterOperator::In | FilterOperator::Between => {
            numeric_or_string_cmp(&cell, text).is_eq()
        }
        FilterOperator::GreaterOrEqual => numeric_or_string_cmp(&cell, text).is_ge(),
        FilterOperator::LessOrEqual => numeric_or_string_cmp(&cell, text).is_le(),
    }
}

/// Apply a scalar operator to `cell.cmp(filter)`. Contains degrades to equality.
fn compare_with(operator: FilterOperator, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match operator {
        FilterOperator::GreaterOrEqual => ordering.is_ge(),
        FilterOperator::LessOrEqual => ordering.is_le(),
        FilterOperator::Contains
        | FilterOperator::Equals
        | FilterOperator::In
        | FilterOperator::Between => ordering.is_eq(),
    }
}

fn within_dates(value: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.is_none_or(|start| value >= start) && end.is_none_or(|end| value <= end)
}

/// Compare two values, preferring numeric comparison when both parse as numbers.
fn numeric_or_string_cmp(a: &str, b: &str) -> Ordering {
    if let (Ok(na), Ok(nb)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        na.partial_cmp(&nb).unwrap_or(Ordering::Equal)
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    }
}

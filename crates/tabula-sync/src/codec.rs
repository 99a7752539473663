//! String codec for filter entries
//!
//! Each entry becomes one key/value pair:
//!
//! | value           | encoded as                           |
//! |-----------------|--------------------------------------|
//! | text / select   | the text itself                      |
//! | number          | `f64` display form (`3`, `2.5`)      |
//! | date            | `YYYY-MM-DD`                         |
//! | boolean         | `true` / `false`                     |
//! | list            | items joined with `,`, `\` escapes   |
//! | date range      | `start..end`, either side may be empty |
//! | number range    | `min..max`, either side may be empty |
//!
//! The key is the filter id. When the operator is not the filter's default it
//! is appended in brackets, e.g. `amount[gte]`.
//!
//! Decoding is driven by the filter's configured kind, so a value never has to
//! carry its own type tag.

use chrono::NaiveDate;
use tabula_core::{FilterConfig, FilterEntry, FilterKind, FilterOperator, FilterValue};
use thiserror::Error;

const RANGE_SEPARATOR: &str = "..";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("malformed key '{0}'")]
    MalformedKey(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid boolean '{0}'")]
    InvalidBool(String),

    #[error("invalid range '{0}', expected start..end")]
    InvalidRange(String),

    #[error("dangling escape in list '{0}'")]
    DanglingEscape(String),

    #[error("value decodes to an empty filter")]
    Empty,
}

/// Short operator code used in keys
pub fn operator_code(operator: FilterOperator) -> &'static str {
    match operator {
        FilterOperator::Contains => "contains",
        FilterOperator::Equals => "eq",
        FilterOperator::In => "in",
        FilterOperator::Between => "between",
        FilterOperator::GreaterOrEqual => "gte",
        FilterOperator::LessOrEqual => "lte",
    }
}

pub fn parse_operator_code(code: &str) -> Result<FilterOperator, CodecError> {
    match code {
        "contains" => Ok(FilterOperator::Contains),
        "eq" => Ok(FilterOperator::Equals),
        "in" => Ok(FilterOperator::In),
        "between" => Ok(FilterOperator::Between),
        "gte" => Ok(FilterOperator::GreaterOrEqual),
        "lte" => Ok(FilterOperator::LessOrEqual),
        other => Err(CodecError::UnknownOperator(other.to_string())),
    }
}

/// Split `id` or `id[op]` into the filter id and an optional operator
pub fn parse_key(key: &str) -> Result<(&str, Option<FilterOperator>), CodecError> {
    let Some(open) = key.find('[') else {
        if key.contains(']') {
            return Err(CodecError::MalformedKey(key.to_string()));
        }
        return Ok((key, None));
    };
    let Some(code) = key[open + 1..].strip_suffix(']') else {
        return Err(CodecError::MalformedKey(key.to_string()));
    };
    let id = &key[..open];
    if id.is_empty() {
        return Err(CodecError::MalformedKey(key.to_string()));
    }
    Ok((id, Some(parse_operator_code(code)?)))
}

/// External key for an entry of `config`
pub fn encode_key(config: &FilterConfig, operator: FilterOperator) -> String {
    if operator == config.default_operator() {
        config.id.clone()
    } else {
        format!("{}[{}]", config.id, operator_code(operator))
    }
}

pub fn encode_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(text) => text.clone(),
        FilterValue::Number(n) => n.to_string(),
        FilterValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::List(items) => items
            .iter()
            .map(|item| escape_item(item))
            .collect::<Vec<_>>()
            .join(","),
        FilterValue::DateRange { start, end } => format!(
            "{}{}{}",
            start.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default(),
            RANGE_SEPARATOR,
            end.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default(),
        ),
        FilterValue::NumberRange { min, max } => format!(
            "{}{}{}",
            min.map(|n| n.to_string()).unwrap_or_default(),
            RANGE_SEPARATOR,
            max.map(|n| n.to_string()).unwrap_or_default(),
        ),
    }
}

/// Encode an entry as one external key/value pair
pub fn encode_entry(config: &FilterConfig, entry: &FilterEntry) -> (String, String) {
    (encode_key(config, entry.operator), encode_value(&entry.value))
}

/// Decode a value for a filter of kind `kind`
pub fn decode_value(kind: &FilterKind, raw: &str) -> Result<FilterValue, CodecError> {
    let value = match kind {
        FilterKind::Text | FilterKind::Select { .. } => FilterValue::Text(raw.to_string()),
        FilterKind::MultiSelect { .. } => FilterValue::List(split_list(raw)?),
        FilterKind::Date => FilterValue::Date(parse_date(raw)?),
        FilterKind::DateRange => {
            let (start, end) = split_range(raw)?;
            FilterValue::DateRange {
                start: optional(start, parse_date)?,
                end: optional(end, parse_date)?,
            }
        }
        FilterKind::Number { .. } if kind.is_range() => {
            let (min, max) = split_range(raw)?;
            FilterValue::NumberRange {
                min: optional(min, parse_number)?,
                max: optional(max, parse_number)?,
            }
        }
        FilterKind::Number { .. } => FilterValue::Number(parse_number(raw)?),
        FilterKind::Boolean => FilterValue::Bool(parse_bool(raw)?),
    };
    if value.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(value)
}

/// Decode one external pair for `config`, given the operator parsed from the key
pub fn decode_entry(
    config: &FilterConfig,
    operator: Option<FilterOperator>,
    raw: &str,
) -> Result<FilterEntry, CodecError> {
    let value = decode_value(&config.kind, raw)?;
    let operator = operator.unwrap_or_else(|| config.default_operator());
    Ok(FilterEntry::new(config.id.clone(), operator, value))
}

fn escape_item(item: &str) -> String {
    let mut out = String::with_capacity(item.len());
    for ch in item.chars() {
        if ch == '\\' || ch == ',' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn split_list(raw: &str) -> Result<Vec<String>, CodecError> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(CodecError::DanglingEscape(raw.to_string())),
            },
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    items.push(current);
    items.retain(|item| !item.is_empty());
    Ok(items)
}

fn split_range(raw: &str) -> Result<(&str, &str), CodecError> {
    raw.split_once(RANGE_SEPARATOR)
        .ok_or_else(|| CodecError::InvalidRange(raw.to_string()))
}

fn optional<T>(
    raw: &str,
    parse: impl Fn(&str) -> Result<T, CodecError>,
) -> Result<Option<T>, CodecError> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CodecError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| CodecError::InvalidDate(raw.to_string()))
}

fn parse_number(raw: &str) -> Result<f64, CodecError> {
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CodecError::InvalidNumber(raw.to_string()))
}

fn parse_bool(raw: &str) -> Result<bool, CodecError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(CodecError::InvalidBool(other.to_string())),
    }
}

//! Cell formatting
//!
//! Resolution order, first match wins:
//!
//! 1. the column's custom renderer, given the value and the whole record
//! 2. the column's custom value formatter
//! 3. null renders empty
//! 4. a default for the column's data type
//! 5. the stringified raw value
//!
//! Values that cannot be formatted for their column type (a date column
//! holding `"tomorrow-ish"`) degrade to the raw string instead of failing.

use std::fmt::Write as _;

use tabula_core::config::is_valid_date_format;
use tabula_core::{BadgeColor, Cell, ColumnDataType, ColumnDescriptor, Fields, FormatConfig, Value};

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns raw record values into renderable cells
#[derive(Debug, Clone)]
pub struct CellFormatter {
    config: FormatConfig,
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl CellFormatter {
    pub fn new(mut config: FormatConfig) -> Self {
        if !is_valid_date_format(&config.date_format) {
            tracing::warn!(
                date_format = %config.date_format,
                "Invalid date format, falling back to {}",
                FALLBACK_DATE_FORMAT
            );
            config.date_format = FALLBACK_DATE_FORMAT.to_string();
        }
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Format the value of `column` read from `record`
    pub fn format_field(&self, column: &ColumnDescriptor, record: &dyn Fields) -> Cell {
        match record.field(&column.field) {
            Some(value) => self.format(&value, column, record),
            None => self.format(&Value::Null, column, record),
        }
    }

    pub fn format(&self, value: &Value, column: &ColumnDescriptor, record: &dyn Fields) -> Cell {
        if let Some(render) = &column.custom_render {
            return render(value, record);
        }
        if let Some(format) = &column.custom_format {
            return Cell::Text(format(value));
        }
        if value.is_null() {
            return Cell::Empty;
        }

        match column.data_type {
            ColumnDataType::String => Cell::Text(value.to_string()),
            ColumnDataType::Number => Cell::Text(
                self.format_number(value)
                    .unwrap_or_else(|| value.to_string()),
            ),
            ColumnDataType::Currency => Cell::Text(
                self.format_currency(value)
                    .unwrap_or_else(|| value.to_string()),
            ),
            ColumnDataType::Date => Cell::Text(
                self.format_date(value)
                    .unwrap_or_else(|| value.to_string()),
            ),
            ColumnDataType::Boolean => match value.as_bool() {
                Some(true) => Cell::Text(self.config.yes_label.clone()),
                Some(false) => Cell::Text(self.config.no_label.clone()),
                None => Cell::Text(value.to_string()),
            },
            ColumnDataType::Status => self.format_status(value, column),
            // Actions only render through a custom renderer
            ColumnDataType::Actions => Cell::Empty,
        }
    }

    fn format_number(&self, value: &Value) -> Option<String> {
        match value {
            Value::Int(i) => Some(group_integer(&i.unsigned_abs().to_string(), *i < 0)),
            _ => {
                let n = value.as_f64()?;
                if !n.is_finite() {
                    return None;
                }
                Some(format_grouped(n, 2, true))
            }
        }
    }

    fn format_currency(&self, value: &Value) -> Option<String> {
        let n = value.as_f64()?;
        if !n.is_finite() {
            return None;
        }
        let digits = format_grouped(n.abs(), self.config.currency_decimals, false);
        let negative = n < 0.0 && digits.chars().any(|c| c.is_ascii_digit() && c != '0');
        let sign = if negative { "-" } else { "" };
        Some(format!("{}{}{}", sign, self.config.currency_symbol, digits))
    }

    fn format_date(&self, value: &Value) -> Option<String> {
        let date = value.as_date()?;
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.config.date_format)) {
            Ok(()) => Some(out),
            Err(_) => {
                tracing::trace!(
                    date_format = %self.config.date_format,
                    "Date format failed, using raw value"
                );
                None
            }
        }
    }

    fn format_status(&self, value: &Value, column: &ColumnDescriptor) -> Cell {
        let raw = value.to_string();
        if raw.is_empty() {
            return Cell::Empty;
        }
        let group = column.status_group.as_deref().unwrap_or_default();
        match self.config.status_palette.lookup(group, &raw) {
            Some(style) => Cell::Badge {
                label: style.label.clone(),
                color: style.color,
            },
            None => {
                tracing::trace!(group, value = %raw, "Status not in palette, using neutral badge");
                Cell::Badge {
                    label: raw,
                    color: BadgeColor::Neutral,
                }
            }
        }
    }
}

/// Format `n` with thousands separators and `decimals` fractional digits.
///
/// With `trim` set, trailing fractional zeros (and a dangling point) are removed.
fn format_grouped(n: f64, decimals: usize, trim: bool) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (fixed.clone(), String::new()),
    };
    let frac_part = if trim {
        frac_part.trim_end_matches('0').to_string()
    } else {
        frac_part
    };
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.chars().all(|c| c == '0');
    let grouped = group_integer(&int_part, n < 0.0 && !is_zero);
    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}

/// Insert `,` every three digits of an unsigned digit string
fn group_integer(digits: &str, negative: bool) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

//! Grid configuration
//!
//! Every field has a default, so a config file only needs to mention what it
//! overrides:
//!
//! ```toml
//! [pagination]
//! page_size_options = [20, 50]
//! default_page_size = 20
//!
//! [filters]
//! mode = "staged"
//!
//! [formatting.status_palette.claims.approved]
//! label = "Approved"
//! color = "success"
//! ```

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{BadgeColor, Breakpoints, NullPosition, Result, TabulaError};

/// Top-level configuration of a grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub pagination: PaginationConfig,
    pub filters: FilterSettings,
    pub layout: LayoutConfig,
    pub formatting: FormatConfig,
    pub sync: SyncConfig,
    pub sorting: SortingConfig,
}

impl GridConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded grid configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let pagination = &self.pagination;
        if pagination.page_size_options.is_empty() {
            return Err(TabulaError::Configuration(
                "page_size_options must not be empty".to_string(),
            ));
        }
        if pagination.page_size_options.contains(&0) {
            return Err(TabulaError::Configuration(
                "page sizes must be greater than zero".to_string(),
            ));
        }
        if !pagination
            .page_size_options
            .contains(&pagination.default_page_size)
        {
            return Err(TabulaError::Configuration(format!(
                "default_page_size {} is not one of the page size options {:?}",
                pagination.default_page_size, pagination.page_size_options
            )));
        }
        let bp = &self.layout.breakpoints;
        if bp.tablet >= bp.desktop {
            return Err(TabulaError::Configuration(format!(
                "tablet breakpoint {} must be below desktop breakpoint {}",
                bp.tablet, bp.desktop
            )));
        }
        if !is_valid_date_format(&self.formatting.date_format) {
            return Err(TabulaError::Configuration(format!(
                "invalid date_format '{}'",
                self.formatting.date_format
            )));
        }
        Ok(())
    }
}

/// Whether chrono can render a plain date with this format string.
///
/// Formats asking for time or offset fields parse fine but fail when applied
/// to a `NaiveDate`, so a sample date is rendered as well.
pub fn is_valid_date_format(format: &str) -> bool {
    use std::fmt::Write as _;

    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let sample = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default();
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Allowed page sizes, requests are snapped to the nearest one
    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size_options: vec![10, 25, 50, 100],
            default_page_size: 10,
        }
    }
}

/// When filter changes reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every change is applied and announced immediately
    #[default]
    Live,
    /// Changes accumulate in a draft until `apply`
    Staged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub mode: FilterMode,
    pub debounce_ms: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            mode: FilterMode::Live,
            debounce_ms: 300,
        }
    }
}

impl FilterSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub breakpoints: Breakpoints,
}

/// Label and color for one status value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusStyle {
    pub label: String,
    #[serde(default)]
    pub color: BadgeColor,
}

impl StatusStyle {
    pub fn new(label: impl Into<String>, color: BadgeColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Status badge lookup table: group -> raw value -> style
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusPalette {
    groups: IndexMap<String, IndexMap<String, StatusStyle>>,
}

impl StatusPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        group: impl Into<String>,
        value: impl Into<String>,
        style: StatusStyle,
    ) -> Self {
        self.insert(group, value, style);
        self
    }

    pub fn insert(&mut self, group: impl Into<String>, value: impl Into<String>, style: StatusStyle) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(value.into(), style);
    }

    /// Look up a style. Values are matched case-insensitively.
    pub fn lookup(&self, group: &str, value: &str) -> Option<&StatusStyle> {
        let entries = self.groups.get(group)?;
        entries.get(value).or_else(|| {
            entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(value))
                .map(|(_, style)| style)
        })
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub currency_symbol: String,
    pub currency_decimals: usize,
    /// chrono format string used for date cells
    pub date_format: String,
    pub yes_label: String,
    pub no_label: String,
    pub status_palette: StatusPalette,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            date_format: "%b %-d, %Y".to_string(),
            yes_label: "Yes".to_string(),
            no_label: "No".to_string(),
            status_palette: StatusPalette::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Mirror filters into the shareable external representation
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingConfig {
    pub null_position: NullPosition,
}

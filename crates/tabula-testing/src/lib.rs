//! Test support for Tabula crates
//!
//! Provides a client-list fixture (columns, filters, records and a status
//! palette) that mirrors a typical list screen, plus one-time tracing setup
//! for test output.

use anyhow::{Context as _, Result, bail};
use chrono::NaiveDate;
use tabula_core::{
    Action, BadgeColor, Cell, ColumnDescriptor, FilterConfig, GridConfig, MapRecord,
    SelectOption, StatusPalette, StatusStyle,
};

/// Initialize logging for tests if not already initialized
///
/// Honors `RUST_LOG`, with Tabula crates at debug by default.
pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let mut filter = tracing_subscriber::EnvFilter::from_default_env();
        for directive in ["tabula_core=debug", "tabula_engine=debug", "tabula_sync=debug"] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Status group used by the client fixture
pub const CLIENT_STATUS_GROUP: &str = "clients";

/// Six client columns, the last one being row actions
pub fn client_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::text("name", "Name").filterable(true).width(220),
        ColumnDescriptor::text("email", "Email"),
        ColumnDescriptor::currency("balance", "Balance").filterable(true),
        ColumnDescriptor::status("status", "Status", CLIENT_STATUS_GROUP).filterable(true),
        ColumnDescriptor::date("created", "Created"),
        ColumnDescriptor::actions("actions", "").render_with(|_, _| {
            Cell::Actions(vec![Action::new("edit", "Edit"), Action::new("delete", "Delete")])
        }),
    ]
}

/// Filter controls of the client list
pub fn client_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::text("q", "Search").on_field("name").placeholder("Search clients"),
        FilterConfig::select(
            "status",
            "Status",
            vec![
                SelectOption::new("active", "Active"),
                SelectOption::new("suspended", "Suspended"),
                SelectOption::new("closed", "Closed"),
            ],
        ),
        FilterConfig::multi_select(
            "tier",
            "Tier",
            vec![
                SelectOption::new("gold", "Gold"),
                SelectOption::new("silver", "Silver"),
                SelectOption::new("bronze", "Bronze"),
            ],
        ),
        FilterConfig::date_range("created", "Created"),
        FilterConfig::number_range("balance", "Balance", Some(0.0), Some(100_000.0)),
        FilterConfig::boolean("vip", "VIP"),
    ]
}

pub fn client_status_palette() -> StatusPalette {
    StatusPalette::new()
        .with(CLIENT_STATUS_GROUP, "active", StatusStyle::new("Active", BadgeColor::Success))
        .with(
            CLIENT_STATUS_GROUP,
            "suspended",
            StatusStyle::new("Suspended", BadgeColor::Warning),
        )
        .with(CLIENT_STATUS_GROUP, "closed", StatusStyle::new("Closed", BadgeColor::Neutral))
}

/// Default configuration with the client status palette installed
pub fn client_grid_config() -> GridConfig {
    let mut config = GridConfig::default();
    config.formatting.status_palette = client_status_palette();
    config
}

const NAMES: [&str; 8] = [
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella",
    "Hooli",
    "Stark Industries",
    "Wayne Enterprises",
    "Wonka",
];
const STATUSES: [&str; 3] = ["active", "suspended", "closed"];
const TIERS: [&str; 3] = ["gold", "silver", "bronze"];

/// `count` deterministic client records keyed by `id` (1-based)
pub fn client_records(count: usize) -> Vec<MapRecord> {
    (0..count).map(client_record).collect()
}

fn client_record(i: usize) -> MapRecord {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let created = base + chrono::Days::new((i * 3) as u64);
    let name = if i < NAMES.len() {
        NAMES[i].to_string()
    } else {
        format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len())
    };
    MapRecord::new("id")
        .with("id", (i + 1) as i64)
        .with("name", name)
        .with("email", format!("contact{}@example.com", i + 1))
        .with("balance", (i as f64) * 1250.5)
        .with("status", STATUSES[i % STATUSES.len()])
        .with("tier", TIERS[i % TIERS.len()])
        .with("vip", i % 4 == 0)
        .with("created", created)
}

/// Parse a JSON array of objects into records
pub fn records_from_json(key_field: &str, json: &str) -> Result<Vec<MapRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("fixture is not valid JSON")?;
    let Some(items) = value.as_array() else {
        bail!("fixture must be a JSON array of objects");
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            MapRecord::from_json(key_field, item).with_context(|| format!("fixture record {i}"))
        })
        .collect()
}

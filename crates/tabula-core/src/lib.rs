//! Tabula Core - Shared types for the tabular data engine
//!
//! This crate provides the types every other Tabula crate depends on:
//!
//! - `Value` - A field value read from a record
//! - `Fields` / `Record` - Keyed-field access to opaque records
//! - `ColumnDescriptor` - Static column metadata, plus the renderable `Cell`
//! - Filter and sort types (`FilterEntry`, `FilterConfig`, `SortSpec`, ...)
//! - `GridConfig` - TOML-loadable configuration
//! - `TabulaError` - Setup-time errors

mod column;
pub mod config;
mod error;
mod filter_types;
mod record;
mod types;
mod viewport;

pub use column::*;
pub use config::{
    FilterMode, FilterSettings, FormatConfig, GridConfig, LayoutConfig, PaginationConfig,
    SortingConfig, StatusPalette, StatusStyle, SyncConfig,
};
pub use error::*;
pub use filter_types::*;
pub use record::*;
pub use types::*;
pub use viewport::*;

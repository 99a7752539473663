//! Error types for Tabula
//!
//! Only integration and configuration mistakes are errors. Runtime data
//! anomalies (stale page requests, unknown sort fields, unparseable cell
//! values) are absorbed by the engine and never surface here.

use thiserror::Error;

/// Core error type for Tabula setup operations
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Duplicate column field: {0}")]
    DuplicateColumn(String),

    #[error("Column '{0}' has data type status but no status group")]
    MissingStatusGroup(String),

    #[error("Column '{0}' has a status group but is not a status column")]
    UnexpectedStatusGroup(String),

    #[error("Duplicate filter id: {0}")]
    DuplicateFilter(String),

    #[error("Invalid filter '{id}': {reason}")]
    InvalidFilter { id: String, reason: String },

    #[error("Record has no value for key field '{0}'")]
    MissingRecordKey(String),

    #[error("View already registered: {0}")]
    ViewAlreadyRegistered(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tabula operations
pub type Result<T> = std::result::Result<T, TabulaError>;

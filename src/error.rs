//! Error types for the I/O-facing surfaces
//!
//! Authoring problems never show up here: those are [`crate::ValidationError`]
//! records. This type covers reading inputs and loading configuration.

use thiserror::Error;

/// Result type for operational failures
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Operational errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

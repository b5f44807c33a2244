//! Error types for the lift_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lift_core operations
///
/// Only the file-facing surfaces (config, plan files) produce errors.
/// Queue building and the session timer are infallible.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan validation error
    #[error("Plan validation error: {0}")]
    PlanValidation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

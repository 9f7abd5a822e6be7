//! Error types for the dependency tracker

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the tracker's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Tracker error types
///
/// None of these ever reach the resolution engine: the listener and the
/// local repository decorator log them and carry on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to write tracking record {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to audit log {path}: {source}")]
    AuditLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

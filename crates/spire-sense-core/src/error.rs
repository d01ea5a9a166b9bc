//! Error types for spire-sense-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for spire-sense operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host does not expose a privileged field (e.g. the dungeon fade timer).
    #[error("Host capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    #[error("Failed to read config file {path}: {message}")]
    ConfigRead { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for spire-sense operations
pub type Result<T> = std::result::Result<T, Error>;

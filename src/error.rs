//! Error types for ingestion, snapshot persistence and configuration
//!
//! None of these are fatal to a running server: the refresh cycle logs them
//! and carries on with whatever it still has.

use thiserror::Error;

/// Failure while retrieving or decoding a single source
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while writing or reading the snapshot file
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to move snapshot into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

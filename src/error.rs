//! Error types for the store, the services and startup configuration.
use thiserror::Error;

/// Failure of the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Unavailable(format!("undecodable record: {}", e))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Unavailable(format!("storage task failed: {}", e))
    }
}

/// Errors surfaced by the ingest and query services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client-caused; the request never reaches the store.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] StoreError),
}

/// Required configuration that is absent or malformed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not configured. Supply {flag} or set {env}.")]
    Missing {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

//! Errors - error types and their classification.

use thiserror::Error;

use super::ids::{DatabaseId, RecordId};

/// Operational classification of an error.
///
/// - Configuration: the run cannot start (nothing was sent to the service).
/// - Remote: a call to the table service failed.
/// - Internal: a worker panicked or was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Remote,
    Internal,
}

/// Invalid or missing settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("database id for the {0} table is not set")]
    MissingDatabaseId(&'static str),

    #[error("API token is not set")]
    MissingToken,

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Failure of a table-store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("unknown table: {0}")]
    UnknownTable(DatabaseId),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("pagination did not advance past cursor {0:?}")]
    StuckCursor(String),

    #[error("injected failure: {0}")]
    Injected(String),
}

/// Top-level error of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("table store error: {0}")]
    Store(#[from] StoreError),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Config(_) => ErrorKind::Configuration,
            SyncError::Store(_) => ErrorKind::Remote,
            SyncError::Worker(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = StoreError::Api {
            status: 400,
            code: "validation_error".into(),
            message: "bad filter".into(),
        };
        assert_eq!(err.to_string(), "API error (400, validation_error): bad filter");
    }

    #[test]
    fn sync_error_kinds() {
        let config: SyncError = ConfigError::MissingDatabaseId("tasks").into();
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert!(config.to_string().contains("tasks"));

        let store: SyncError = StoreError::NotFound(RecordId::new("r1")).into();
        assert_eq!(store.kind(), ErrorKind::Remote);
        assert!(store.to_string().contains("r1"));
    }
}

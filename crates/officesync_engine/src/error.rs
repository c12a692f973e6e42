//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the backend.
///
/// None of these ever reach application code through the engine's entry
/// points; they are logged and counted. Backends return them so the
/// engine can log something useful.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The backend answered with an error status.
    #[error("backend rejected {table}: {status} {message}")]
    Backend {
        /// Table the request targeted.
        table: String,
        /// HTTP-like status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Network or transport error; the request may not have arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request or response body was not valid JSON of the expected shape.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl SyncError {
    /// Creates a backend rejection.
    pub fn backend(table: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            table: table.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Returns true if the same request could succeed later.
    ///
    /// The engine never retries; this only shapes log output.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Transport(_) => true,
            SyncError::Backend { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Encoding(err.to_string())
    }
}

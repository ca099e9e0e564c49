//! Unified error types for geocache.
//!
//! Negative geocoding outcomes (provider failures, an active retry window) are
//! values, see [`crate::resolver::GeocodeOutcome`]. Only input, configuration and
//! storage problems are errors.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::credentials::API_KEY_SETTING;

/// Unified error types for geocache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The address was empty after trimming.
    #[error("EMPTY_ADDRESS: address must not be empty")]
    EmptyAddress,

    /// No API key is configured for the geocoding provider.
    #[error("MISSING_CREDENTIAL: {API_KEY_SETTING} is not configured")]
    MissingCredential,

    /// A record for this address already exists.
    #[error("DUPLICATE_ADDRESS: {0}")]
    DuplicateAddress(String),

    /// Invalid input parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be turned back into a record.
    #[error("CACHE_ERROR: invalid record: {0}")]
    InvalidRecord(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::EmptyAddress | Error::InvalidInput(_) => -32602,
            Error::MissingCredential => -32010,
            Error::DuplicateAddress(_) | Error::Database(_) | Error::MigrationFailed(_) | Error::InvalidRecord(_) => {
                -32002
            }
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

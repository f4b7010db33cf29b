//! Client error types.

use didit_core::entry::EntryError;
use didit_core::sync::{MutationError, SyncError};
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] EntryError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Could not load entries: {0}")]
    LoadFailed(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<&ClientError> for SyncError {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::ServerError { status, message } => SyncError::Server {
                status: *status,
                message: message.clone(),
            },
            ClientError::InvalidResponse(entry_error) => SyncError::Validation(entry_error.clone()),
            other => SyncError::Request(other.to_string()),
        }
    }
}

impl From<ClientError> for SyncError {
    fn from(error: ClientError) -> Self {
        SyncError::from(&error)
    }
}

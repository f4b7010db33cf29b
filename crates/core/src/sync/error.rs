use thiserror::Error;

use crate::entry::EntryError;

/// Cause stored in a failed query or mutation.
///
/// This is a cloneable projection of the transport errors so that state
/// snapshots can be handed to any number of observers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Malformed entry from server: {0}")]
    Validation(#[from] EntryError),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

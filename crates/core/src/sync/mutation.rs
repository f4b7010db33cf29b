use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::error::SyncError;
use crate::entry::EntryId;

/// A single create or delete action against the entry service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMutation {
    Create { name: String },
    Delete { id: EntryId },
}

impl EntryMutation {
    pub fn create(name: impl Into<String>) -> Self {
        EntryMutation::Create { name: name.into() }
    }

    pub fn delete(id: EntryId) -> Self {
        EntryMutation::Delete { id }
    }
}

impl fmt::Display for EntryMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryMutation::Create { name } => write!(f, "create entry for {}", name),
            EntryMutation::Delete { id } => write!(f, "delete entry {}", id),
        }
    }
}

/// Status discriminant of a [`MutationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Lifecycle of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Error(SyncError),
}

/// Errors returned when running a mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Mutation already started (status: {0:?})")]
    AlreadyStarted(MutationStatus),
    #[error("Failed to {operation}: {source}")]
    Failed {
        operation: String,
        #[source]
        source: SyncError,
    },
}

impl MutationState {
    pub fn status(&self) -> MutationStatus {
        match self {
            MutationState::Idle => MutationStatus::Idle,
            MutationState::Pending => MutationStatus::Pending,
            MutationState::Success => MutationStatus::Success,
            MutationState::Error(_) => MutationStatus::Error,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, MutationState::Success | MutationState::Error(_))
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            MutationState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Guarded transition `Idle -> Pending`. A mutation record runs once.
    pub fn start(&self) -> Result<MutationState, MutationError> {
        match self {
            MutationState::Idle => Ok(MutationState::Pending),
            other => Err(MutationError::AlreadyStarted(other.status())),
        }
    }

    /// Settles a pending mutation with the outcome of the remote call.
    pub fn settle(result: &Result<(), SyncError>) -> MutationState {
        match result {
            Ok(()) => MutationState::Success,
            Err(error) => MutationState::Error(error.clone()),
        }
    }
}

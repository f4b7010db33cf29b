//! Fetch state of one cached query.
//!
//! The four statuses are a tagged union so that the invariants hold by
//! construction: a `Success` always carries data, an `Error` always carries a
//! cause, and a fetch can only begin from a state that is not `Loading`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::SyncError;

/// Status discriminant of a [`QueryState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Data returned by a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

/// Fetch state of a query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState<T> {
    /// Never fetched.
    Idle,
    /// A fetch is in flight. Keeps the last successful result, if any.
    Loading { previous: Option<Fetched<T>> },
    /// The last fetch succeeded.
    Success(Fetched<T>),
    /// The last fetch failed. Keeps the last successful result, if any.
    Error {
        error: SyncError,
        previous: Option<Fetched<T>>,
    },
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<T: Clone> QueryState<T> {
    pub fn status(&self) -> QueryStatus {
        match self {
            QueryState::Idle => QueryStatus::Idle,
            QueryState::Loading { .. } => QueryStatus::Loading,
            QueryState::Success(_) => QueryStatus::Success,
            QueryState::Error { .. } => QueryStatus::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading { .. })
    }

    /// Returns the most recent successful result, whatever the current status.
    pub fn last_fetched(&self) -> Option<&Fetched<T>> {
        match self {
            QueryState::Idle => None,
            QueryState::Success(fetched) => Some(fetched),
            QueryState::Loading { previous } | QueryState::Error { previous, .. } => {
                previous.as_ref()
            }
        }
    }

    /// Returns the most recent data, whatever the current status.
    pub fn data(&self) -> Option<&T> {
        self.last_fetched().map(|f| &f.data)
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched().map(|f| f.fetched_at)
    }

    /// Guarded transition into `Loading`.
    ///
    /// Returns `None` when a fetch is already in flight, which is how the
    /// cache dedupes requests for the same key.
    pub fn begin_fetch(&self) -> Option<QueryState<T>> {
        if self.is_loading() {
            return None;
        }
        Some(QueryState::Loading {
            previous: self.last_fetched().cloned(),
        })
    }

    /// Commits the outcome of a fetch.
    ///
    /// A success replaces the data wholesale; a failure keeps the previous
    /// data around for display.
    pub fn complete(self, result: Result<T, SyncError>, now: DateTime<Utc>) -> QueryState<T> {
        match result {
            Ok(data) => QueryState::Success(Fetched {
                data,
                fetched_at: now,
            }),
            Err(error) => QueryState::Error {
                error,
                previous: self.last_fetched().cloned(),
            },
        }
    }
}

//! Derivation of the visible entry list from session and query state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entry::{filter_entries_by_name, Entry};
use crate::sync::QueryState;

/// What the surrounding view layer should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum EntriesView {
    /// No session: show a login affordance.
    LoggedOut,
    /// A fetch is pending. `rows` holds the last rendered list, if any, so
    /// the list does not flash empty during a refetch.
    Loading {
        user: String,
        rows: Option<Vec<Entry>>,
    },
    /// The last fetch failed.
    Error { user: String, message: String },
    /// The user's entries in server order.
    Ready {
        user: String,
        rows: Vec<Entry>,
        fetched_at: DateTime<Utc>,
    },
}

impl EntriesView {
    /// Rows to display, if any.
    pub fn rows(&self) -> Option<&[Entry]> {
        match self {
            EntriesView::Ready { rows, .. } => Some(rows),
            EntriesView::Loading { rows, .. } => rows.as_deref(),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&str> {
        match self {
            EntriesView::LoggedOut => None,
            EntriesView::Loading { user, .. }
            | EntriesView::Error { user, .. }
            | EntriesView::Ready { user, .. } => Some(user),
        }
    }
}

/// Derives the view for `session` from the cached entry list.
///
/// The full list is always fetched; filtering by owner happens here.
pub fn derive_view(session: Option<&str>, state: &QueryState<Vec<Entry>>) -> EntriesView {
    let Some(user) = session else {
        return EntriesView::LoggedOut;
    };

    let mine = |entries: &[Entry]| -> Vec<Entry> {
        filter_entries_by_name(entries, user)
            .into_iter()
            .cloned()
            .collect()
    };

    match state {
        QueryState::Idle => EntriesView::Loading {
            user: user.to_string(),
            rows: None,
        },
        QueryState::Loading { previous } => EntriesView::Loading {
            user: user.to_string(),
            rows: previous.as_ref().map(|f| mine(&f.data)),
        },
        QueryState::Error { error, .. } => EntriesView::Error {
            user: user.to_string(),
            message: error.to_string(),
        },
        QueryState::Success(fetched) => EntriesView::Ready {
            user: user.to_string(),
            rows: mine(&fetched.data),
            fetched_at: fetched.fetched_at,
        },
    }
}

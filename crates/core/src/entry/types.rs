use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned entry identifier.
pub type EntryId = i64;

/// A named, timestamped record owned by a user.
///
/// Entries are immutable once fetched. A fetch replaces the whole list, it
/// never patches individual entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Owner identity. Not unique across entries.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates a new entry.
    pub fn new(id: EntryId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }

    /// Returns true if this entry belongs to `name`.
    pub fn is_owned_by(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Request payload for creating a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
}

impl CreateEntryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

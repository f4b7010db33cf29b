use thiserror::Error;

/// Errors that can occur when validating an entry received from the server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Expected a JSON array of entries, got {0}")]
    NotAList(String),
    #[error("Expected a JSON object for an entry, got {0}")]
    NotAnObject(String),
    #[error("Entry id must be an integer")]
    InvalidId,
    #[error("Entry name must be a string")]
    InvalidName,
    #[error("Entry created_at is not a valid ISO-8601 timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Invalid entry at index {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<EntryError>,
    },
}

impl EntryError {
    /// Wraps an element error with its position in the list.
    pub fn at_index(index: usize, source: EntryError) -> Self {
        EntryError::AtIndex {
            index,
            source: Box::new(source),
        }
    }
}

mod error;
mod keys;
mod mutation;
mod query;

pub use error::{Result, SyncError};
pub use keys::{QueryKey, ENTRIES_KEY};
pub use mutation::{EntryMutation, MutationError, MutationState, MutationStatus};
pub use query::{Fetched, QueryState, QueryStatus};

mod error;
mod operations;
mod parse;
mod types;

pub use error::EntryError;
pub use operations::filter_entries_by_name;
pub use parse::{parse_entry, parse_entry_list};
pub use types::{CreateEntryRequest, Entry, EntryId};

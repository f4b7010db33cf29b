use super::types::Entry;

/// Filters entries owned by `name`, preserving server order.
pub fn filter_entries_by_name<'a>(entries: &'a [Entry], name: &str) -> Vec<&'a Entry> {
    entries
        .iter()
        .filter(|entry| entry.is_owned_by(name))
        .collect()
}

/// Logical identifier for one cached, fetchable resource.
pub type QueryKey = &'static str;

/// The single query key used for the shared entry list.
pub const ENTRIES_KEY: QueryKey = "entries";

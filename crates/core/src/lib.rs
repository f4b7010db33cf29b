//! didit_core - Functional Core for the didit entry client.
//!
//! Pure data types and state transitions with no I/O. The imperative shell
//! (HTTP, async cache, CLI) lives in `didit_client`.

pub mod confirm;
pub mod entry;
pub mod sync;
pub mod view;

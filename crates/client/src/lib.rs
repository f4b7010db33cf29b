//! didit_client - Client and data-synchronization layer for the didit entry service.
//!
//! The HTTP client talks to the remote entry service. On top of it sit the
//! query cache, the mutation executor and the session/view binding that the
//! `didit-client` CLI drives.

pub mod binding;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod mutation;
pub mod output;
pub mod service;
pub mod session;

pub use binding::EntriesBinding;
pub use cache::{Invalidation, QueryCache, QueryLoader};
pub use client::DiditClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use mutation::{Mutation, MutationExecutor};
pub use service::EntryService;
pub use session::Session;

//! The remote entry service as seen by the synchronization layer.

use std::sync::Arc;

use async_trait::async_trait;
use didit_core::entry::{CreateEntryRequest, Entry, EntryId};
use didit_core::sync::{EntryMutation, SyncError};

use crate::cache::QueryLoader;
use crate::client::DiditClient;
use crate::error::Result;

/// Operations the synchronization layer needs from the entry service.
#[async_trait]
pub trait EntryService: Send + Sync {
    /// Fetches and validates the full entry list.
    async fn list_entries(&self) -> Result<Vec<Entry>>;

    /// Creates an entry owned by `name`.
    async fn create_entry(&self, name: &str) -> Result<()>;

    /// Deletes an entry by id.
    async fn delete_entry(&self, id: EntryId) -> Result<()>;

    /// Performs a mutation against the service.
    async fn perform(&self, mutation: &EntryMutation) -> Result<()> {
        match mutation {
            EntryMutation::Create { name } => self.create_entry(name).await,
            EntryMutation::Delete { id } => self.delete_entry(*id).await,
        }
    }
}

#[async_trait]
impl EntryService for DiditClient {
    async fn list_entries(&self) -> Result<Vec<Entry>> {
        DiditClient::list_entries(self).await
    }

    async fn create_entry(&self, name: &str) -> Result<()> {
        DiditClient::create_entry(self, &CreateEntryRequest::new(name)).await
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> {
        DiditClient::delete_entry(self, id).await
    }
}

/// Loader for the entry list query.
#[derive(Clone)]
pub struct EntriesLoader {
    service: Arc<dyn EntryService>,
}

impl EntriesLoader {
    pub fn new(service: Arc<dyn EntryService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl QueryLoader<Vec<Entry>> for EntriesLoader {
    async fn load(&self) -> std::result::Result<Vec<Entry>, SyncError> {
        self.service.list_entries().await.map_err(SyncError::from)
    }
}

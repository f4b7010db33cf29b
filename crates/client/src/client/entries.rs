//! Entry API operations.

use super::DiditClient;
use crate::error::Result;
use didit_core::entry::{parse_entry_list, CreateEntryRequest, Entry, EntryId};

impl DiditClient {
    /// List all entries (GET /list/).
    ///
    /// Every element is validated; one malformed entry fails the whole list.
    pub async fn list_entries(&self) -> Result<Vec<Entry>> {
        let response = self
            .client
            .get(self.url("/list/"))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let raw = self.handle_json_response(response).await?;
        let entries = parse_entry_list(&raw)?;
        tracing::debug!(count = entries.len(), "Fetched entries");
        Ok(entries)
    }

    /// Create a new entry (POST /post).
    pub async fn create_entry(&self, req: &CreateEntryRequest) -> Result<()> {
        let response = self
            .client
            .post(self.url("/post"))
            .json(req)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    /// Delete entry by ID (DELETE /entry/{id}).
    pub async fn delete_entry(&self, id: EntryId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/entry/{}", id)))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}

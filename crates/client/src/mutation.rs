//! Mutation records and the executor that runs them.
//!
//! A successful mutation invalidates the entries query before its future
//! completes, so a caller awaiting the mutation always observes the cache as
//! `Loading` (or already refreshed) afterwards. A failed mutation leaves the cache
//! untouched.

use std::future::Future;
use std::sync::Arc;

use didit_core::entry::Entry;
use didit_core::sync::{
    EntryMutation, MutationError, MutationState, QueryKey, SyncError, ENTRIES_KEY,
};
use tokio::sync::watch;

use crate::cache::QueryCache;
use crate::service::EntryService;

/// One user-initiated create or delete, with its observable lifecycle.
#[derive(Debug)]
pub struct Mutation {
    operation: EntryMutation,
    state: watch::Sender<MutationState>,
}

impl Mutation {
    pub fn new(operation: EntryMutation) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self { operation, state }
    }

    pub fn operation(&self) -> &EntryMutation {
        &self.operation
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }
}

/// Runs mutations against the entry service and keeps the query cache fresh.
#[derive(Clone)]
pub struct MutationExecutor {
    service: Arc<dyn EntryService>,
    cache: QueryCache<Vec<Entry>>,
    invalidates: QueryKey,
}

impl MutationExecutor {
    pub fn new(service: Arc<dyn EntryService>, cache: QueryCache<Vec<Entry>>) -> Self {
        Self {
            service,
            cache,
            invalidates: ENTRIES_KEY,
        }
    }

    /// Starts `mutation` and returns the future that completes it.
    ///
    /// `Idle -> Pending` is committed before this returns, so observers see
    /// `Pending` as soon as the mutation is invoked. No retry is attempted on
    /// failure.
    pub fn run<'a>(
        &'a self,
        mutation: &'a Mutation,
    ) -> impl Future<Output = Result<(), MutationError>> + Send + 'a {
        let started = mutation.state.borrow().start();
        let started = started.map(|pending| {
            mutation.state.send_replace(pending);
        });

        async move {
            started?;
            let operation = mutation.operation();
            tracing::debug!(operation = %operation, "Mutation pending");

            let result = self
                .service
                .perform(operation)
                .await
                .map_err(SyncError::from);

            mutation.state.send_replace(MutationState::settle(&result));

            match result {
                Ok(()) => {
                    let invalidation = self.cache.invalidate(self.invalidates);
                    tracing::info!(
                        operation = %operation,
                        invalidation = ?invalidation,
                        "Mutation succeeded"
                    );
                    Ok(())
                }
                Err(source) => {
                    tracing::warn!(operation = %operation, error = %source, "Mutation failed");
                    Err(MutationError::Failed {
                        operation: operation.to_string(),
                        source,
                    })
                }
            }
        }
    }

    /// Creates and runs a mutation in one step.
    pub async fn execute(&self, operation: EntryMutation) -> Result<(), MutationError> {
        self.run(&Mutation::new(operation)).await
    }
}

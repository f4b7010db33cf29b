//! Composition of session, query cache, mutations and delete confirmation.
//!
//! This is the surface the view layer talks to: it renders [`EntriesView`]
//! and forwards user actions (login, create, delete with confirmation).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use didit_core::confirm::{ConfirmPhase, DeleteConfirmations};
use didit_core::entry::{Entry, EntryId};
use didit_core::sync::{EntryMutation, QueryState, ENTRIES_KEY};
use didit_core::view::{derive_view, EntriesView};
use tokio::sync::watch;

use crate::cache::QueryCache;
use crate::error::{ClientError, Result};
use crate::mutation::{Mutation, MutationExecutor};
use crate::service::{EntriesLoader, EntryService};
use crate::session::Session;

/// View-facing binding over the entry list.
#[derive(Clone)]
pub struct EntriesBinding {
    session: Session,
    cache: QueryCache<Vec<Entry>>,
    executor: MutationExecutor,
    loader: Arc<EntriesLoader>,
    confirmations: Arc<Mutex<DeleteConfirmations>>,
}

impl EntriesBinding {
    pub fn new(service: Arc<dyn EntryService>, session: Session) -> Self {
        let cache = QueryCache::new();
        let loader = Arc::new(EntriesLoader::new(Arc::clone(&service)));
        cache.register(ENTRIES_KEY, loader.clone());
        Self {
            session,
            executor: MutationExecutor::new(service, cache.clone()),
            cache,
            loader,
            confirmations: Arc::new(Mutex::new(DeleteConfirmations::new())),
        }
    }

    fn confirmations(&self) -> MutexGuard<'_, DeleteConfirmations> {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &QueryCache<Vec<Entry>> {
        &self.cache
    }

    /// Initial fetch of the entry list.
    pub async fn mount(&self) {
        self.cache.fetch(ENTRIES_KEY, self.loader.clone()).await;
    }

    /// Current view, derived from session and cached entries.
    pub fn view(&self) -> EntriesView {
        derive_view(
            self.session.current().as_deref(),
            &self.cache.get_state(ENTRIES_KEY),
        )
    }

    /// View once any in-flight fetch has completed.
    pub async fn settled_view(&self) -> EntriesView {
        let state = self.cache.settled(ENTRIES_KEY).await;
        derive_view(self.session.current().as_deref(), &state)
    }

    /// Subscribes to entry list state changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<Entry>>> {
        self.cache.subscribe(ENTRIES_KEY)
    }

    pub fn login(&self, name: impl Into<String>) {
        self.session.login(name);
    }

    /// Ends the session and drops any pending delete confirmations.
    pub fn logout(&self) {
        self.session.logout();
        *self.confirmations() = DeleteConfirmations::new();
    }

    /// Looks up one of the current user's rows.
    ///
    /// A failed entry fetch is reported with its cause, not as a missing row.
    pub fn find_row(&self, id: EntryId) -> Result<Entry> {
        match self.view() {
            EntriesView::LoggedOut => Err(ClientError::NotLoggedIn),
            EntriesView::Error { message, .. } => Err(ClientError::LoadFailed(message)),
            view => view
                .rows()
                .and_then(|rows| rows.iter().find(|e| e.id == id))
                .cloned()
                .ok_or_else(|| ClientError::InvalidInput(format!("No entry {} for this user", id))),
        }
    }

    /// Creates an entry owned by the current session user.
    pub async fn create_entry(&self) -> Result<()> {
        let user = self.session.current().ok_or(ClientError::NotLoggedIn)?;
        let mutation = Mutation::new(EntryMutation::create(user));
        self.executor.run(&mutation).await?;
        Ok(())
    }

    /// First step of a delete: moves `id` to `Confirming`.
    pub fn press_delete(&self, id: EntryId) -> ConfirmPhase {
        tracing::debug!(id, "Delete pressed, awaiting confirmation");
        self.confirmations().press_delete(id)
    }

    /// Abandons a pending delete. Returns true if one was pending.
    pub fn cancel_delete(&self, id: EntryId) -> bool {
        self.confirmations().cancel(id)
    }

    pub fn confirmation(&self, id: EntryId) -> ConfirmPhase {
        self.confirmations().phase(id)
    }

    /// Commits a pending delete.
    ///
    /// Runs exactly one delete mutation if `id` was confirming and returns
    /// `Ok(Some(id))` on success; returns `Ok(None)` without touching the
    /// service otherwise. The confirmation is cleared before the mutation
    /// runs, so the row is `Idle` whatever the outcome.
    pub async fn confirm_delete(&self, id: EntryId) -> Result<Option<EntryId>> {
        let pending = self.confirmations().confirm(id);
        let Some(id) = pending else {
            tracing::debug!(id, "Confirm without pending delete, ignoring");
            return Ok(None);
        };
        let mutation = Mutation::new(EntryMutation::delete(id));
        self.executor.run(&mutation).await?;
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use didit_core::sync::QueryStatus;

    #[derive(Default)]
    struct FakeService {
        entries: Mutex<Vec<Entry>>,
        deletes: Mutex<Vec<EntryId>>,
        fail_deletes: bool,
        fail_lists: bool,
    }

    impl FakeService {
        fn with_entries(names: &[&str]) -> Self {
            let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let entries = names
                .iter()
                .enumerate()
                .map(|(i, name)| Entry::new(i as EntryId + 1, *name, created_at))
                .collect();
            Self {
                entries: Mutex::new(entries),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl EntryService for FakeService {
        async fn list_entries(&self) -> Result<Vec<Entry>> {
            if self.fail_lists {
                return Err(ClientError::ServerError {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn create_entry(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn delete_entry(&self, id: EntryId) -> Result<()> {
            self.deletes.lock().unwrap().push(id);
            if self.fail_deletes {
                return Err(ClientError::ServerError {
                    status: 500,
                    message: "db".to_string(),
                });
            }
            self.entries.lock().unwrap().retain(|e| e.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_logged_out_view() {
        let binding = EntriesBinding::new(Arc::new(FakeService::default()), Session::default());
        binding.mount().await;
        assert_eq!(binding.view(), EntriesView::LoggedOut);
    }

    #[tokio::test]
    async fn test_view_filters_by_session() {
        let service = Arc::new(FakeService::with_entries(&["a", "b", "a"]));
        let binding = EntriesBinding::new(service, Session::default());
        binding.login("a");
        binding.mount().await;

        let ids: Vec<_> = binding.view().rows().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let binding = EntriesBinding::new(Arc::new(FakeService::default()), Session::default());
        let result = binding.create_entry().await;
        assert!(matches!(result, Err(ClientError::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_cancel_delete_runs_nothing() {
        let service = Arc::new(FakeService::with_entries(&["a", "a"]));
        let binding = EntriesBinding::new(service.clone(), Session::new(Some("a".into())));
        binding.mount().await;

        assert_eq!(binding.press_delete(2), ConfirmPhase::Confirming);
        assert_eq!(binding.confirmation(1), ConfirmPhase::Idle);
        assert!(binding.cancel_delete(2));

        assert_eq!(binding.confirmation(2), ConfirmPhase::Idle);
        assert!(service.deletes.lock().unwrap().is_empty());
        assert_eq!(binding.confirm_delete(2).await.unwrap(), None);
        assert!(service.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_delete_runs_one_mutation_and_refetches() {
        let service = Arc::new(FakeService::with_entries(&["a", "a"]));
        let binding = EntriesBinding::new(service.clone(), Session::new(Some("a".into())));
        binding.mount().await;

        binding.press_delete(2);
        assert_eq!(binding.confirm_delete(2).await.unwrap(), Some(2));

        assert_eq!(binding.confirmation(2), ConfirmPhase::Idle);
        assert_eq!(*service.deletes.lock().unwrap(), vec![2]);
        assert_eq!(binding.cache().get_state(ENTRIES_KEY).status(), QueryStatus::Loading);

        let view = binding.settled_view().await;
        let ids: Vec<_> = view.rows().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_failed_delete_returns_row_to_idle() {
        let service = Arc::new(FakeService {
            fail_deletes: true,
            ..FakeService::with_entries(&["a"])
        });
        let binding = EntriesBinding::new(service.clone(), Session::new(Some("a".into())));
        binding.mount().await;
        let before = binding.cache().get_state(ENTRIES_KEY);

        binding.press_delete(1);
        let result = binding.confirm_delete(1).await;

        assert!(matches!(result, Err(ClientError::Mutation(_))));
        assert_eq!(binding.confirmation(1), ConfirmPhase::Idle);
        assert_eq!(binding.cache().get_state(ENTRIES_KEY), before);
    }

    #[tokio::test]
    async fn test_logout_clears_confirmations() {
        let binding = EntriesBinding::new(
            Arc::new(FakeService::default()),
            Session::new(Some("a".into())),
        );
        binding.press_delete(7);
        binding.logout();

        assert_eq!(binding.confirmation(7), ConfirmPhase::Idle);
        assert_eq!(binding.view(), EntriesView::LoggedOut);
    }

    #[tokio::test]
    async fn test_find_row_reports_fetch_failure() {
        let service = Arc::new(FakeService {
            fail_lists: true,
            ..FakeService::with_entries(&["a"])
        });
        let binding = EntriesBinding::new(service, Session::new(Some("a".into())));
        binding.mount().await;

        match binding.find_row(1) {
            Err(ClientError::LoadFailed(message)) => {
                assert!(message.contains("unavailable"), "{}", message)
            }
            other => panic!("expected load failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_find_row_only_sees_own_rows() {
        let service = Arc::new(FakeService::with_entries(&["a", "b"]));
        let binding = EntriesBinding::new(service, Session::new(Some("a".into())));
        binding.mount().await;

        assert_eq!(binding.find_row(1).unwrap().id, 1);
        assert!(matches!(binding.find_row(2), Err(ClientError::InvalidInput(_))));
    }
}

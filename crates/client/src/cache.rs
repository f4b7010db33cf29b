//! Keyed query cache with fetch dedupe and coalesced invalidation.
//!
//! Each key owns one [`QueryState`] published through a `watch` channel.
//! Slots are guarded by a synchronous lock that is never held across an
//! `.await`; the only suspension point is the loader itself.
//!
//! - `fetch` starts a load unless one is already in flight for the key.
//! - `invalidate` starts a load with the registered loader, or, when one is in
//!   flight, schedules a single follow-up load for when it completes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use didit_core::sync::{QueryState, SyncError};
use tokio::sync::watch;

/// An async operation producing the data of one query.
#[async_trait]
pub trait QueryLoader<T>: Send + Sync {
    async fn load(&self) -> Result<T, SyncError>;
}

/// Outcome of an invalidation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// A new fetch was started in the background.
    Started,
    /// A fetch was in flight; one follow-up fetch will run after it.
    Coalesced,
    /// No loader is registered for the key, nothing to refetch.
    NoLoader,
}

struct Slot<T> {
    state: watch::Sender<QueryState<T>>,
    loader: Option<Arc<dyn QueryLoader<T>>>,
    refetch_requested: bool,
}

impl<T> Slot<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            state,
            loader: None,
            refetch_requested: false,
        }
    }
}

impl<T: Clone> Slot<T> {
    /// Moves the slot into `Loading`. Returns false if it already was.
    fn begin_fetch(&mut self) -> bool {
        let next = self.state.borrow().begin_fetch();
        match next {
            Some(loading) => {
                self.state.send_replace(loading);
                true
            }
            None => false,
        }
    }
}

/// Single-source-of-truth cache of query states, keyed by query key.
pub struct QueryCache<T> {
    slots: Arc<Mutex<HashMap<String, Slot<T>>>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current snapshot for `key`. Unknown keys are `Idle`.
    pub fn get_state(&self, key: &str) -> QueryState<T> {
        self.lock()
            .get(key)
            .map(|slot| slot.state.borrow().clone())
            .unwrap_or_default()
    }

    /// Subscribes to every state committed for `key`.
    pub fn subscribe(&self, key: &str) -> watch::Receiver<QueryState<T>> {
        self.lock()
            .entry(key.to_string())
            .or_insert_with(Slot::new)
            .state
            .subscribe()
    }

    /// Registers the loader used by `invalidate` for `key`.
    pub fn register(&self, key: &str, loader: Arc<dyn QueryLoader<T>>) {
        self.lock()
            .entry(key.to_string())
            .or_insert_with(Slot::new)
            .loader = Some(loader);
    }

    /// Fetches `key` with `loader` and waits for the result to be committed.
    ///
    /// If a fetch is already in flight this returns immediately without
    /// issuing a second request; use [`QueryCache::settled`] to wait for it.
    /// The load runs on a spawned task, so dropping the returned future does
    /// not abandon the fetch.
    pub async fn fetch(&self, key: &str, loader: Arc<dyn QueryLoader<T>>) {
        let started = {
            let mut slots = self.lock();
            let slot = slots.entry(key.to_string()).or_insert_with(Slot::new);
            slot.loader = Some(Arc::clone(&loader));
            slot.begin_fetch()
        };

        if !started {
            tracing::debug!(key = %key, "Fetch already in flight, skipping");
            return;
        }

        let cache = self.clone();
        let owned_key = key.to_string();
        let handle = tokio::spawn(async move { cache.run(owned_key, loader).await });
        if let Err(error) = handle.await {
            tracing::error!(key = %key, error = %error, "Fetch task failed");
        }
    }

    /// Marks `key` stale and refetches it with its registered loader.
    ///
    /// The transition to `Loading` happens before this returns; the load runs
    /// on a spawned task, so this must be called within a tokio runtime.
    pub fn invalidate(&self, key: &str) -> Invalidation {
        let loader = {
            let mut slots = self.lock();
            let Some(slot) = slots.get_mut(key) else {
                return Invalidation::NoLoader;
            };
            let Some(loader) = slot.loader.clone() else {
                return Invalidation::NoLoader;
            };
            if !slot.begin_fetch() {
                slot.refetch_requested = true;
                tracing::debug!(key = %key, "Invalidation coalesced into in-flight fetch");
                return Invalidation::Coalesced;
            }
            loader
        };

        tracing::debug!(key = %key, "Invalidated, refetching");
        let cache = self.clone();
        let key = key.to_string();
        tokio::spawn(async move { cache.run(key, loader).await });
        Invalidation::Started
    }

    /// Waits until `key` is not loading and returns its state.
    pub async fn settled(&self, key: &str) -> QueryState<T> {
        let mut rx = self.subscribe(key);
        let settled = rx.wait_for(|state| !state.is_loading()).await.map(|s| s.clone());
        match settled {
            Ok(state) => state,
            Err(_) => self.get_state(key),
        }
    }

    /// Runs loads for a slot that is already `Loading` until no follow-up
    /// fetch is requested.
    async fn run(&self, key: String, mut loader: Arc<dyn QueryLoader<T>>) {
        loop {
            let result = loader.load().await;
            if let Err(error) = &result {
                tracing::warn!(key = %key, error = %error, "Fetch failed");
            }

            let follow_up = {
                let mut slots = self.lock();
                let slot = slots.entry(key.clone()).or_insert_with(Slot::new);
                let current = slot.state.borrow().clone();
                let mut next = current.complete(result, Utc::now());

                let follow_up = if std::mem::take(&mut slot.refetch_requested) {
                    if let Some(loading) = next.begin_fetch() {
                        next = loading;
                    }
                    slot.loader.clone()
                } else {
                    None
                };
                slot.state.send_replace(next);
                follow_up
            };

            match follow_up {
                Some(next_loader) => {
                    tracing::debug!(key = %key, "Running coalesced refetch");
                    loader = next_loader;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use didit_core::sync::QueryStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    const KEY: &str = "entries";

    /// Returns the call number; each call yields once before completing.
    #[derive(Default)]
    struct CountingLoader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryLoader<usize> for CountingLoader {
        async fn load(&self) -> Result<usize, SyncError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            Ok(n)
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl QueryLoader<usize> for FailingLoader {
        async fn load(&self) -> Result<usize, SyncError> {
            Err(SyncError::Request("connection refused".to_string()))
        }
    }

    /// Blocks each call until a permit is released, tracking concurrency.
    struct GatedLoader {
        gate: Semaphore,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl GatedLoader {
        fn new() -> Self {
            Self {
                gate: Semaphore::new(0),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryLoader<usize> for GatedLoader {
        async fn load(&self) -> Result<usize, SyncError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.gate.acquire().await.unwrap().forget();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(n)
        }
    }

    #[test]
    fn test_unknown_key_is_idle() {
        let cache: QueryCache<usize> = QueryCache::new();
        assert_eq!(cache.get_state(KEY), QueryState::Idle);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let cache = QueryCache::new();
        let loader = Arc::new(CountingLoader::default());

        cache.fetch(KEY, loader.clone()).await;

        let state = cache.get_state(KEY);
        assert_eq!(state.status(), QueryStatus::Success);
        assert_eq!(state.data(), Some(&1));
        assert!(state.fetched_at().is_some());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error() {
        let cache = QueryCache::new();

        cache.fetch(KEY, Arc::new(FailingLoader)).await;

        let state = cache.get_state(KEY);
        assert_eq!(state.status(), QueryStatus::Error);
        assert_eq!(
            state.error(),
            Some(&SyncError::Request("connection refused".to_string()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_fetch_is_deduped() {
        let cache = QueryCache::new();
        let loader = Arc::new(CountingLoader::default());

        tokio::join!(
            cache.fetch(KEY, loader.clone()),
            cache.fetch(KEY, loader.clone())
        );
        cache.settled(KEY).await;

        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get_state(KEY).data(), Some(&1));
    }

    #[tokio::test]
    async fn test_invalidate_without_loader() {
        let cache: QueryCache<usize> = QueryCache::new();
        assert_eq!(cache.invalidate(KEY), Invalidation::NoLoader);
        assert_eq!(cache.get_state(KEY), QueryState::Idle);
    }

    #[tokio::test]
    async fn test_invalidate_moves_to_loading_synchronously() {
        let cache = QueryCache::new();
        let loader = Arc::new(CountingLoader::default());
        cache.fetch(KEY, loader.clone()).await;

        assert_eq!(cache.invalidate(KEY), Invalidation::Started);
        let loading = cache.get_state(KEY);
        assert_eq!(loading.status(), QueryStatus::Loading);
        assert_eq!(loading.data(), Some(&1));

        let state = cache.settled(KEY).await;
        assert_eq!(state.status(), QueryStatus::Success);
        assert_eq!(state.data(), Some(&2));
    }

    #[tokio::test]
    async fn test_invalidate_in_flight_is_coalesced() {
        let cache = QueryCache::new();
        let loader = Arc::new(GatedLoader::new());
        cache.register(KEY, loader.clone());

        assert_eq!(cache.invalidate(KEY), Invalidation::Started);
        assert_eq!(cache.invalidate(KEY), Invalidation::Coalesced);
        assert_eq!(cache.invalidate(KEY), Invalidation::Coalesced);

        loader.gate.add_permits(2);
        let state = cache.settled(KEY).await;

        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(state.data(), Some(&2));
    }

    #[tokio::test]
    async fn test_subscribe_observes_loading_then_success() {
        let cache = QueryCache::new();
        let loader = Arc::new(CountingLoader::default());
        cache.register(KEY, loader.clone());
        let mut rx = cache.subscribe(KEY);

        cache.invalidate(KEY);
        assert_eq!(rx.borrow_and_update().status(), QueryStatus::Loading);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status(), QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_dropped_fetch_still_completes() {
        let cache = QueryCache::new();
        let loader = Arc::new(GatedLoader::new());

        let dropped =
            tokio::time::timeout(Duration::from_millis(10), cache.fetch(KEY, loader.clone())).await;
        assert!(dropped.is_err());
        assert_eq!(cache.get_state(KEY).status(), QueryStatus::Loading);

        loader.gate.add_permits(1);
        let state = cache.settled(KEY).await;
        assert_eq!(state.status(), QueryStatus::Success);
        assert_eq!(state.data(), Some(&1));

        loader.gate.add_permits(1);
        cache.fetch(KEY, loader.clone()).await;
        assert_eq!(cache.get_state(KEY).data(), Some(&2));

        assert_eq!(cache.invalidate(KEY), Invalidation::Started);
        loader.gate.add_permits(1);
        assert_eq!(cache.settled(KEY).await.data(), Some(&3));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = QueryCache::new();
        cache.fetch("a", Arc::new(CountingLoader::default())).await;

        assert_eq!(cache.get_state("a").status(), QueryStatus::Success);
        assert_eq!(cache.get_state("b").status(), QueryStatus::Idle);
    }
}

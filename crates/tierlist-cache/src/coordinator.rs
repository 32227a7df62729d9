//! Cache coordinator — one tiered snapshot per scope, at most one
//! concurrent recomputation per scope.
//!
//! Misses take a per-scope lock (a sharded map of mutexes, so unrelated
//! scopes never wait on each other) and re-check the cache before loading,
//! so a stampede of concurrent misses produces a single recomputation.
//! Invalidation takes the same lock, which orders it after any in-flight
//! recomputation and guarantees that a stale snapshot cannot be installed
//! after a mutation has returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use tierlist_core::{RecordFilter, RolePreferences, Scope};
use tierlist_engine::score_and_tier;
use tierlist_state::RecordStore;

use crate::error::{CacheError, CacheResult};
use crate::memory::CacheStore;
use crate::snapshot::TieredSnapshot;

pub struct CacheCoordinator {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
    /// Per-scope recomputation locks: scope → mutex.
    locks: DashMap<Scope, Arc<Mutex<()>>>,
    preferences: RolePreferences,
    ttl: Duration,
    recomputes: AtomicU64,
}

impl CacheCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheStore>,
        preferences: RolePreferences,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            locks: DashMap::new(),
            preferences,
            ttl,
            recomputes: AtomicU64::new(0),
        }
    }

    /// Preferences every cached snapshot is computed with.
    pub fn preferences(&self) -> RolePreferences {
        self.preferences
    }

    /// The tiered snapshot for `scope`, recomputing it on a miss.
    ///
    /// `cancel` aborts the load from the record store; once records are
    /// loaded the (bounded, CPU-only) computation runs to completion.
    pub async fn snapshot(
        &self,
        scope: &Scope,
        cancel: &CancellationToken,
    ) -> CacheResult<Arc<TieredSnapshot>> {
        if let Some(hit) = self.cache.get(scope).await? {
            return Ok(hit);
        }

        let lock = self.lock_for(scope);
        let _guard = lock.lock().await;

        // Another caller may have rebuilt the snapshot while we waited.
        if let Some(hit) = self.cache.get(scope).await? {
            debug!(%scope, "snapshot rebuilt by concurrent caller");
            return Ok(hit);
        }

        let filter = RecordFilter::default();
        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%scope, "snapshot load cancelled");
                return Err(CacheError::Cancelled);
            }
            loaded = self.store.load_records(scope, &filter) => loaded?,
        };

        let started = Instant::now();
        let count = records.len();
        let scored = score_and_tier(records, self.preferences);
        let snapshot = Arc::new(TieredSnapshot::new(scope.clone(), scored, self.preferences));
        self.recomputes.fetch_add(1, Ordering::Relaxed);

        self.cache.set(scope, Arc::clone(&snapshot), self.ttl).await?;
        info!(
            %scope,
            records = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "snapshot recomputed"
        );
        Ok(snapshot)
    }

    /// Drop the snapshot for `scope` so the next read recomputes it.
    pub async fn invalidate(&self, scope: &Scope) -> CacheResult<()> {
        let lock = self.lock_for(scope);
        let _guard = lock.lock().await;
        self.cache.invalidate(scope).await
    }

    /// Number of recomputations performed since creation.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes.load(Ordering::Relaxed)
    }

    fn lock_for(&self, scope: &Scope) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(scope.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCacheStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex as StdMutex;
    use tierlist_core::{AttributeContribution, Record, RecordId};
    use tierlist_state::{StateError, StateResult};

    /// In-memory record store that counts loads and can be slowed down.
    #[derive(Default)]
    struct CountingStore {
        records: StdMutex<Vec<Record>>,
        loads: AtomicU64,
        delay: Duration,
    }

    impl CountingStore {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        fn push(&self, record: Record) {
            self.records.lock().unwrap().push(record);
        }

        fn loads(&self) -> u64 {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn load_records(
            &self,
            scope: &Scope,
            filter: &RecordFilter,
        ) -> StateResult<Vec<Record>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            // Read first, then stall: writes during the delay are not seen.
            let loaded: Vec<Record> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.scope == *scope && r.cost > 0 && filter.matches(r))
                .cloned()
                .collect();
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(loaded)
        }

        async fn get_record(&self, id: RecordId) -> StateResult<Option<Record>> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn save_record(&self, record: &Record) -> StateResult<Option<Scope>> {
            self.push(record.clone());
            Ok(None)
        }

        async fn delete_record(&self, _id: RecordId) -> StateResult<Option<Record>> {
            Err(StateError::Unavailable("read-only test store".into()))
        }
    }

    fn record(id: u64, scope: &str, cost: u32) -> Record {
        Record {
            id: RecordId(id),
            name: format!("r{id}"),
            scope: Scope::from(scope),
            ingredients: Vec::new(),
            attributes: vec![AttributeContribution::new("STR", dec!(1))],
            cost,
        }
    }

    fn coordinator(store: Arc<CountingStore>) -> CacheCoordinator {
        CacheCoordinator::new(
            store,
            Arc::new(MemoryCacheStore::new()),
            RolePreferences::default(),
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let store = Arc::new(CountingStore::default());
        store.push(record(1, "public", 2));
        store.push(record(2, "public", 4));
        let coord = coordinator(store.clone());
        let cancel = CancellationToken::new();

        let first = coord.snapshot(&Scope::from("public"), &cancel).await.unwrap();
        let second = coord.snapshot(&Scope::from("public"), &cancel).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(first.records.iter().all(|r| r.tier.is_some()));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.loads(), 1);
        assert_eq!(coord.recompute_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_misses_collapse_into_one_recompute() {
        let store = Arc::new(CountingStore::with_delay(Duration::from_millis(50)));
        store.push(record(1, "public", 2));
        let coord = Arc::new(coordinator(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let coord = coord.clone();
            handles.push(tokio::spawn(async move {
                coord
                    .snapshot(&Scope::from("public"), &CancellationToken::new())
                    .await
                    .unwrap()
            }));
        }
        let mut snapshots = Vec::new();
        for h in handles {
            snapshots.push(h.await.unwrap());
        }

        assert_eq!(store.loads(), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }

    #[tokio::test]
    async fn scopes_are_cached_independently() {
        let store = Arc::new(CountingStore::default());
        store.push(record(1, "a", 2));
        store.push(record(2, "b", 2));
        store.push(record(3, "b", 3));
        let coord = coordinator(store.clone());
        let cancel = CancellationToken::new();

        assert_eq!(coord.snapshot(&Scope::from("a"), &cancel).await.unwrap().len(), 1);
        assert_eq!(coord.snapshot(&Scope::from("b"), &cancel).await.unwrap().len(), 2);
        assert_eq!(store.loads(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_recompute() {
        let store = Arc::new(CountingStore::default());
        store.push(record(1, "public", 2));
        let coord = coordinator(store.clone());
        let cancel = CancellationToken::new();
        let scope = Scope::from("public");

        coord.snapshot(&scope, &cancel).await.unwrap();
        store.push(record(2, "public", 5));
        coord.invalidate(&scope).await.unwrap();

        let refreshed = coord.snapshot(&scope, &cancel).await.unwrap();
        assert_eq!(refreshed.len(), 2);
        assert_eq!(coord.recompute_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_waits_for_inflight_recompute() {
        let store = Arc::new(CountingStore::with_delay(Duration::from_millis(100)));
        store.push(record(1, "public", 2));
        let coord = Arc::new(coordinator(store.clone()));
        let scope = Scope::from("public");

        let inflight = {
            let coord = coord.clone();
            let scope = scope.clone();
            tokio::spawn(async move { coord.snapshot(&scope, &CancellationToken::new()).await })
        };

        // Mutate while the first load is stalled, then invalidate.
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.push(record(2, "public", 5));
        coord.invalidate(&scope).await.unwrap();

        let stale = inflight.await.unwrap().unwrap();
        assert_eq!(stale.len(), 1);

        // The stale snapshot was installed before the invalidation, not after it.
        let fresh = coord.snapshot(&scope, &CancellationToken::new()).await.unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(store.loads(), 2);
        assert_eq!(coord.recompute_count(), 2);
    }

    #[tokio::test]
    async fn cancelled_load_caches_nothing() {
        let store = Arc::new(CountingStore::with_delay(Duration::from_secs(30)));
        store.push(record(1, "public", 2));
        let coord = coordinator(store.clone());
        let scope = Scope::from("public");

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = coord.snapshot(&scope, &cancel).await;
        assert!(matches!(result, Err(CacheError::Cancelled)));
        assert_eq!(coord.recompute_count(), 0);

        // The scope lock was released: invalidation does not hang.
        coord.invalidate(&scope).await.unwrap();
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        struct Down;

        #[async_trait]
        impl RecordStore for Down {
            async fn load_records(&self, _: &Scope, _: &RecordFilter) -> StateResult<Vec<Record>> {
                Err(StateError::Unavailable("connection refused".into()))
            }
            async fn get_record(&self, _: RecordId) -> StateResult<Option<Record>> {
                Ok(None)
            }
            async fn save_record(&self, _: &Record) -> StateResult<Option<Scope>> {
                Ok(None)
            }
            async fn delete_record(&self, _: RecordId) -> StateResult<Option<Record>> {
                Ok(None)
            }
        }

        let coord = CacheCoordinator::new(
            Arc::new(Down),
            Arc::new(MemoryCacheStore::new()),
            RolePreferences::default(),
            Duration::from_secs(300),
        );
        let result = coord
            .snapshot(&Scope::from("public"), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(CacheError::Store(StateError::Unavailable(_)))));
    }
}

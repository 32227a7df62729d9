//! Cache store contract and the in-process TTL implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use tierlist_core::Scope;

use crate::error::CacheResult;
use crate::snapshot::TieredSnapshot;

/// Scope-keyed snapshot cache with per-entry expiration.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// A live (unexpired) snapshot for the scope, if any.
    async fn get(&self, scope: &Scope) -> CacheResult<Option<Arc<TieredSnapshot>>>;

    async fn set(
        &self,
        scope: &Scope,
        snapshot: Arc<TieredSnapshot>,
        ttl: Duration,
    ) -> CacheResult<()>;

    async fn invalidate(&self, scope: &Scope) -> CacheResult<()>;
}

struct CacheEntry {
    snapshot: Arc<TieredSnapshot>,
    expires_at: Instant,
}

/// Sharded in-memory cache; reads never contend on a global lock.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<Scope, CacheEntry>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, scope: &Scope) -> CacheResult<Option<Arc<TieredSnapshot>>> {
        let now = Instant::now();
        let live = match self.entries.get(scope) {
            Some(entry) if entry.expires_at > now => Some(Arc::clone(&entry.snapshot)),
            Some(_) => None,
            None => return Ok(None),
        };
        // The read guard is released above; removing under it would deadlock the shard.
        if live.is_none() {
            self.entries.remove_if(scope, |_, e| e.expires_at <= now);
            debug!(%scope, "expired snapshot evicted");
        }
        Ok(live)
    }

    async fn set(
        &self,
        scope: &Scope,
        snapshot: Arc<TieredSnapshot>,
        ttl: Duration,
    ) -> CacheResult<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .insert(scope.clone(), CacheEntry { snapshot, expires_at });
        Ok(())
    }

    async fn invalidate(&self, scope: &Scope) -> CacheResult<()> {
        let existed = self.entries.remove(scope).is_some();
        debug!(%scope, existed, "snapshot invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierlist_core::RolePreferences;

    fn snapshot(scope: &str) -> Arc<TieredSnapshot> {
        Arc::new(TieredSnapshot::new(
            Scope::from(scope),
            Vec::new(),
            RolePreferences::default(),
        ))
    }

    #[tokio::test]
    async fn set_then_get_returns_same_snapshot() {
        let cache = MemoryCacheStore::new();
        let scope = Scope::from("public");
        let snap = snapshot("public");

        cache.set(&scope, snap.clone(), Duration::from_secs(300)).await.unwrap();
        let hit = cache.get(&scope).await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&hit, &snap));
    }

    #[tokio::test]
    async fn miss_on_unknown_scope() {
        let cache = MemoryCacheStore::new();
        assert!(cache.get(&Scope::from("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_evicted() {
        let cache = MemoryCacheStore::new();
        let scope = Scope::from("public");

        cache.set(&scope, snapshot("public"), Duration::ZERO).await.unwrap();
        assert_eq!(cache.len(), 1);

        assert!(cache.get(&scope).await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidate_only_touches_one_scope() {
        let cache = MemoryCacheStore::new();
        let ttl = Duration::from_secs(300);
        cache.set(&Scope::from("a"), snapshot("a"), ttl).await.unwrap();
        cache.set(&Scope::from("b"), snapshot("b"), ttl).await.unwrap();

        cache.invalidate(&Scope::from("a")).await.unwrap();

        assert!(cache.get(&Scope::from("a")).await.unwrap().is_none());
        assert!(cache.get(&Scope::from("b")).await.unwrap().is_some());
    }
}

//! TierlistService — the query and mutation surface over store and cache.
//!
//! Reads are served from the scope's cached snapshot whenever the query
//! does not change the tiering universe; everything else loads and tiers
//! its own universe. Mutations write to the store and invalidate every
//! scope they touched before returning.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use tierlist_cache::{CacheCoordinator, CacheStore, TieredSnapshot};
use tierlist_core::config::SearchConfig;
use tierlist_core::{Record, RecordId, Scope, TierlistConfig};
use tierlist_engine::{Category, Role, ScoredRecord, category_of_symbol, compute_metrics};
use tierlist_state::RecordStore;

use crate::error::{SearchError, SearchResult};
use crate::pipeline::{SearchPage, SearchQuery, run_pipeline, search_snapshot};
use crate::queries::{
    AttributeStats, attribute_analysis, representative_view, top_by_attribute, top_by_role,
};

pub struct TierlistService {
    store: Arc<dyn RecordStore>,
    coordinator: Arc<CacheCoordinator>,
    search: SearchConfig,
}

impl TierlistService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn CacheStore>,
        config: &TierlistConfig,
    ) -> Self {
        let coordinator = CacheCoordinator::new(
            Arc::clone(&store),
            cache,
            config.scoring.preferences(),
            config.cache.ttl(),
        );
        Self {
            store,
            coordinator: Arc::new(coordinator),
            search: config.search.clone(),
        }
    }

    pub fn coordinator(&self) -> &CacheCoordinator {
        &self.coordinator
    }

    /// Run a search over `scope`.
    ///
    /// Metrics and tiers always cover the whole universe the query selects
    /// before any post-filter or pagination is applied.
    pub async fn search_records(
        &self,
        scope: &Scope,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchPage> {
        query.validate()?;
        let configured = self.coordinator.preferences();
        if query.uses_snapshot(configured) {
            let snapshot = self.coordinator.snapshot(scope, cancel).await?;
            debug!(%scope, cached = true, "search");
            return search_snapshot(&snapshot.records, query, &self.search);
        }

        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            loaded = self.store.load_records(scope, &query.filter) => loaded?,
        };
        debug!(%scope, cached = false, universe = records.len(), "search");
        let preferences = query.preferences.unwrap_or(configured);
        run_pipeline(records, query, preferences, &self.search)
    }

    /// A single record with its metrics. Its tier is always `Unknown`:
    /// a record on its own has no peers to be ranked against.
    pub async fn get_record_by_id(&self, id: RecordId) -> SearchResult<ScoredRecord> {
        let record = self
            .store
            .get_record(id)
            .await?
            .ok_or(SearchError::NotFound(id))?;
        let metrics = compute_metrics(&record, self.coordinator.preferences());
        Ok(ScoredRecord::new(record, metrics))
    }

    pub async fn top_records_by_attribute(
        &self,
        scope: &Scope,
        symbol: &str,
        limit: usize,
    ) -> SearchResult<Vec<ScoredRecord>> {
        if category_of_symbol(symbol.trim()) == Category::Unrecognized {
            return Err(SearchError::InvalidQuery(format!("unknown attribute symbol: {symbol}")));
        }
        let snapshot = self.snapshot(scope).await?;
        Ok(top_by_attribute(&snapshot.records, symbol.trim(), self.limit(limit)))
    }

    pub async fn top_records_by_role(
        &self,
        scope: &Scope,
        role: Role,
        limit: usize,
    ) -> SearchResult<Vec<ScoredRecord>> {
        let snapshot = self.snapshot(scope).await?;
        Ok(top_by_role(&snapshot.records, role, self.limit(limit)))
    }

    pub async fn attribute_analysis(&self, scope: &Scope) -> SearchResult<Vec<AttributeStats>> {
        let snapshot = self.snapshot(scope).await?;
        Ok(attribute_analysis(&snapshot.records))
    }

    pub async fn representative_records(&self, scope: &Scope) -> SearchResult<Vec<ScoredRecord>> {
        let snapshot = self.snapshot(scope).await?;
        Ok(representative_view(&snapshot.records))
    }

    /// Insert or update a record, then invalidate its scope (and the scope
    /// it moved out of, if any).
    pub async fn save_record(&self, record: &Record) -> SearchResult<()> {
        let previous = self.store.save_record(record).await?;
        self.coordinator.invalidate(&record.scope).await?;
        if let Some(previous) = previous.filter(|p| *p != record.scope) {
            self.coordinator.invalidate(&previous).await?;
            info!(id = %record.id, from = %previous, to = %record.scope, "record moved");
        } else {
            info!(id = %record.id, scope = %record.scope, "record saved");
        }
        Ok(())
    }

    /// Delete a record and invalidate the scope it lived in.
    pub async fn delete_record(&self, id: RecordId) -> SearchResult<Record> {
        let removed = self
            .store
            .delete_record(id)
            .await?
            .ok_or(SearchError::NotFound(id))?;
        self.coordinator.invalidate(&removed.scope).await?;
        info!(%id, scope = %removed.scope, "record deleted");
        Ok(removed)
    }

    async fn snapshot(&self, scope: &Scope) -> SearchResult<Arc<TieredSnapshot>> {
        Ok(self.coordinator.snapshot(scope, &CancellationToken::new()).await?)
    }

    fn limit(&self, requested: usize) -> usize {
        requested.clamp(1, self.search.max_take.max(1))
    }
}

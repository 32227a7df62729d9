//! The record store contract consumed by the cache coordinator and the
//! search pipeline.

use async_trait::async_trait;

use tierlist_core::{Record, RecordFilter, RecordId, Scope};

use crate::error::{StateError, StateResult};
use crate::store::{StateStore, map_err};

/// Source of raw records, bounded by visibility scope.
///
/// Implementations must never return records with `cost == 0`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records of `scope` matching `filter`.
    async fn load_records(&self, scope: &Scope, filter: &RecordFilter) -> StateResult<Vec<Record>>;

    async fn get_record(&self, id: RecordId) -> StateResult<Option<Record>>;

    /// Insert or update. Returns the scope the record previously lived in.
    async fn save_record(&self, record: &Record) -> StateResult<Option<Scope>>;

    /// Returns the removed record, if it existed.
    async fn delete_record(&self, id: RecordId) -> StateResult<Option<Record>>;
}

/// Run a synchronous redb operation off the async executor.
async fn blocking<T, F>(f: F) -> StateResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StateResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(map_err!(Task))?
}

#[async_trait]
impl RecordStore for StateStore {
    async fn load_records(&self, scope: &Scope, filter: &RecordFilter) -> StateResult<Vec<Record>> {
        let store = self.clone();
        let scope = scope.clone();
        let filter = filter.clone();
        blocking(move || store.load_matching(&scope, &filter)).await
    }

    async fn get_record(&self, id: RecordId) -> StateResult<Option<Record>> {
        let store = self.clone();
        blocking(move || store.get_record(id)).await
    }

    async fn save_record(&self, record: &Record) -> StateResult<Option<Scope>> {
        let store = self.clone();
        let record = record.clone();
        blocking(move || store.put_record(&record)).await
    }

    async fn delete_record(&self, id: RecordId) -> StateResult<Option<Record>> {
        let store = self.clone();
        blocking(move || store.delete_record(id)).await
    }
}

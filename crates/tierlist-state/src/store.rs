//! StateStore — redb-backed record persistence for Tierlist.
//!
//! Provides typed CRUD operations over recipe records. All values are
//! JSON-serialized into redb's `&[u8]` value columns. The store supports
//! both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use tierlist_core::{Record, RecordFilter, RecordId, Scope};

use crate::error::{StateError, StateResult};
use crate::tables::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

pub(crate) use map_err;

/// Composite key for the records table.
fn record_key(scope: &Scope, id: RecordId) -> String {
    format!("{scope}/{:020}", id.0)
}

/// Thread-safe record store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent record store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "record store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory record store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory record store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(RECORDS).map_err(map_err!(Table))?;
        txn.open_table(RECORD_SCOPES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Insert or update a record.
    ///
    /// Returns the scope the record was previously stored under, if any.
    pub fn put_record(&self, record: &Record) -> StateResult<Option<Scope>> {
        let key = record_key(&record.scope, record.id);
        let value = serde_json::to_vec(record).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let previous;
        {
            let mut scopes = txn.open_table(RECORD_SCOPES).map_err(map_err!(Table))?;
            let mut records = txn.open_table(RECORDS).map_err(map_err!(Table))?;
            previous = scopes
                .insert(record.id.0, record.scope.as_str())
                .map_err(map_err!(Write))?
                .map(|guard| Scope::new(guard.value()));
            if let Some(old) = previous.as_ref().filter(|old| **old != record.scope) {
                records
                    .remove(record_key(old, record.id).as_str())
                    .map_err(map_err!(Write))?;
            }
            records
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, moved_from = ?previous, "record stored");
        Ok(previous)
    }

    /// Get a record by id.
    pub fn get_record(&self, id: RecordId) -> StateResult<Option<Record>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let scopes = txn.open_table(RECORD_SCOPES).map_err(map_err!(Table))?;
        let scope = match scopes.get(id.0).map_err(map_err!(Read))? {
            Some(guard) => Scope::new(guard.value()),
            None => return Ok(None),
        };
        let table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
        match table
            .get(record_key(&scope, id).as_str())
            .map_err(map_err!(Read))?
        {
            Some(guard) => {
                let record: Record =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// List every record stored under a scope, zero-cost ones included.
    pub fn list_records(&self, scope: &Scope) -> StateResult<Vec<Record>> {
        let prefix = format!("{scope}/");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().starts_with(&prefix) {
                let record: Record =
                    serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
                // A scope containing '/' can share a prefix with another scope.
                if record.scope == *scope {
                    results.push(record);
                }
            }
        }
        Ok(results)
    }

    /// Records of a scope that match the pre-filter, excluding zero-cost records.
    pub fn load_matching(&self, scope: &Scope, filter: &RecordFilter) -> StateResult<Vec<Record>> {
        let all = self.list_records(scope)?;
        let total = all.len();
        let matching: Vec<Record> = all
            .into_iter()
            .filter(|r| r.cost > 0 && filter.matches(r))
            .collect();
        debug!(%scope, total, matching = matching.len(), "records loaded");
        Ok(matching)
    }

    /// Delete a record by id. Returns the removed record if it existed.
    pub fn delete_record(&self, id: RecordId) -> StateResult<Option<Record>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let removed;
        {
            let mut scopes = txn.open_table(RECORD_SCOPES).map_err(map_err!(Table))?;
            let mut records = txn.open_table(RECORDS).map_err(map_err!(Table))?;
            let scope = scopes
                .remove(id.0)
                .map_err(map_err!(Write))?
                .map(|guard| Scope::new(guard.value()));
            removed = match scope {
                Some(scope) => match records
                    .remove(record_key(&scope, id).as_str())
                    .map_err(map_err!(Write))?
                {
                    Some(guard) => Some(
                        serde_json::from_slice::<Record>(guard.value())
                            .map_err(map_err!(Deserialize))?,
                    ),
                    None => None,
                },
                None => None,
            };
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%id, existed = removed.is_some(), "record deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tierlist_core::AttributeContribution;

    fn test_record(id: u64, scope: &str, name: &str, cost: u32) -> Record {
        Record {
            id: RecordId(id),
            name: name.to_string(),
            scope: Scope::from(scope),
            ingredients: vec!["Carrot".to_string()],
            attributes: vec![AttributeContribution::new("STR+1", dec!(1.5))],
            cost,
        }
    }

    // ── Record CRUD ────────────────────────────────────────────────

    #[test]
    fn record_put_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let record = test_record(1, "public", "Stew", 4);

        assert_eq!(store.put_record(&record).unwrap(), None);
        let retrieved = store.get_record(RecordId(1)).unwrap();

        assert_eq!(retrieved, Some(record));
    }

    #[test]
    fn record_get_nonexistent_returns_none() {
        let store = StateStore::open_in_memory().unwrap();
        assert!(store.get_record(RecordId(42)).unwrap().is_none());
    }

    #[test]
    fn record_list_by_scope() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_record(&test_record(1, "public", "a", 1)).unwrap();
        store.put_record(&test_record(2, "public", "b", 1)).unwrap();
        store.put_record(&test_record(3, "guild-7", "c", 1)).unwrap();
        store.put_record(&test_record(4, "public/alt", "d", 1)).unwrap();

        assert_eq!(store.list_records(&Scope::from("public")).unwrap().len(), 2);
        assert_eq!(store.list_records(&Scope::from("guild-7")).unwrap().len(), 1);
        assert_eq!(store.list_records(&Scope::from("public/alt")).unwrap().len(), 1);
    }

    #[test]
    fn record_update_in_place() {
        let store = StateStore::open_in_memory().unwrap();
        let mut record = test_record(1, "public", "Stew", 4);
        store.put_record(&record).unwrap();

        record.cost = 9;
        let previous = store.put_record(&record).unwrap();
        assert_eq!(previous, Some(Scope::from("public")));

        let retrieved = store.get_record(RecordId(1)).unwrap().unwrap();
        assert_eq!(retrieved.cost, 9);
        assert_eq!(store.list_records(&Scope::from("public")).unwrap().len(), 1);
    }

    #[test]
    fn record_moving_scope_leaves_old_scope() {
        let store = StateStore::open_in_memory().unwrap();
        let mut record = test_record(1, "public", "Stew", 4);
        store.put_record(&record).unwrap();

        record.scope = Scope::from("guild-7");
        let previous = store.put_record(&record).unwrap();

        assert_eq!(previous, Some(Scope::from("public")));
        assert!(store.list_records(&Scope::from("public")).unwrap().is_empty());
        assert_eq!(store.list_records(&Scope::from("guild-7")).unwrap().len(), 1);
        assert_eq!(
            store.get_record(RecordId(1)).unwrap().unwrap().scope,
            Scope::from("guild-7")
        );
    }

    #[test]
    fn record_delete() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_record(&test_record(1, "public", "Stew", 4)).unwrap();

        let removed = store.delete_record(RecordId(1)).unwrap();
        assert_eq!(removed.map(|r| r.name), Some("Stew".to_string()));
        assert!(store.delete_record(RecordId(1)).unwrap().is_none());
        assert!(store.get_record(RecordId(1)).unwrap().is_none());
    }

    // ── Loading ────────────────────────────────────────────────────

    #[test]
    fn load_excludes_zero_cost() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_record(&test_record(1, "public", "a", 0)).unwrap();
        store.put_record(&test_record(2, "public", "b", 3)).unwrap();

        let loaded = store
            .load_matching(&Scope::from("public"), &RecordFilter::default())
            .unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, RecordId(2));
    }

    #[test]
    fn load_applies_pre_filter() {
        let store = StateStore::open_in_memory().unwrap();
        store.put_record(&test_record(1, "public", "Fish Stew", 3)).unwrap();
        store.put_record(&test_record(2, "public", "Berry Tart", 3)).unwrap();
        store.put_record(&test_record(3, "public", "Fish Pie", 30)).unwrap();

        let filter = RecordFilter {
            text: Some("fish".into()),
            cost_ceiling: Some(10),
            ..RecordFilter::default()
        };
        let loaded = store.load_matching(&Scope::from("public"), &filter).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Fish Stew");
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            store.put_record(&test_record(5, "public", "Stew", 2)).unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        let record = store.get_record(RecordId(5)).unwrap();
        assert!(record.is_some());
        assert_eq!(record.unwrap().name, "Stew");
    }

    // ── Edge cases ─────────────────────────────────────────────────

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_records(&Scope::from("any")).unwrap().is_empty());
        assert!(store
            .load_matching(&Scope::from("any"), &RecordFilter::default())
            .unwrap()
            .is_empty());
        assert!(store.delete_record(RecordId(1)).unwrap().is_none());
    }
}

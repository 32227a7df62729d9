//! redb table definitions for the Tierlist record store.

use redb::TableDefinition;

/// Records keyed by `{scope}/{id:020}`; values are JSON-serialized `Record`s.
pub const RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// Scope of each record, keyed by record id.
pub const RECORD_SCOPES: TableDefinition<u64, &str> = TableDefinition::new("record_scopes");

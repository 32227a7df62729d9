//! tierlist-state — the record store behind Tierlist.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for recipe records. Pipelines consume it through the async
//! [`RecordStore`] contract, which also owns the zero-cost exclusion rule:
//! records with `cost == 0` are incomplete data and never leave the store.
//!
//! # Architecture
//!
//! Records are JSON-serialized into redb's `&[u8]` value columns under a
//! composite `{scope}/{id}` key. A secondary `id → scope` table resolves
//! lookups by id and lets updates report the scope a record moved out of.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod record_store;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use record_store::RecordStore;
pub use store::StateStore;

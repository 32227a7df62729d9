//! tierlist-cache — the dataset cache in front of the tiering engine.
//!
//! Holds one fully computed (metrics + tiers) snapshot per visibility scope
//! and collapses concurrent misses for the same scope into a single
//! recomputation.
//!
//! # Architecture
//!
//! ```text
//! CacheCoordinator
//!   ├── snapshot(scope)  ← fast path: live CacheStore entry, no locking
//!   │     └── miss → per-scope lock → re-check → load → score → tier → set
//!   ├── invalidate(scope) ← called by every mutation before it returns
//!   ├── RecordStore (load_records, cancellable)
//!   └── CacheStore (get / set with TTL / invalidate)
//! ```

pub mod coordinator;
pub mod error;
pub mod memory;
pub mod snapshot;

pub use coordinator::CacheCoordinator;
pub use error::{CacheError, CacheResult};
pub use memory::{CacheStore, MemoryCacheStore};
pub use snapshot::TieredSnapshot;

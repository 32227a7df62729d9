//! Immutable, shareable tiered collections.

use std::time::{SystemTime, UNIX_EPOCH};

use tierlist_core::{RolePreferences, Scope};
use tierlist_engine::ScoredRecord;

/// Every visible record of a scope with metrics and tiers computed over the
/// whole scope. Shared behind `Arc` and never mutated once built.
#[derive(Debug, Clone)]
pub struct TieredSnapshot {
    pub scope: Scope,
    pub records: Vec<ScoredRecord>,
    pub preferences: RolePreferences,
    /// Unix timestamp (seconds) when the snapshot was computed.
    pub computed_at: u64,
}

impl TieredSnapshot {
    pub fn new(scope: Scope, records: Vec<ScoredRecord>, preferences: RolePreferences) -> Self {
        Self {
            scope,
            records,
            preferences,
            computed_at: epoch_secs(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

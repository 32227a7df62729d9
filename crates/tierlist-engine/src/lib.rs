//! Tierlist engine — the pure computation behind recipe rankings.
//!
//! Turns a record's raw attribute contributions into normalized scores and
//! partitions a whole candidate set into dataset-relative quality tiers.
//! Nothing here performs I/O or holds state; callers own the collections.
//!
//! # Components
//!
//! - **`categorizer`** — Attribute identifier → (category, tier)
//! - **`metrics`** — Per-record derived metrics (purity, role scores, efficiency)
//! - **`tiering`** — Role partitions, percentile cutoffs, bonus/penalty adjustments
//! - **`variants`** — Concentration-weighted scoring for picking one variant per name

pub mod categorizer;
pub mod metrics;
pub mod tiering;
pub mod variants;

pub use categorizer::{AttributeTier, Category, categorize, category_of_symbol, known_symbols};
pub use metrics::{DerivedMetrics, compute_metrics, score_and_tier, score_collection};
pub use tiering::{Role, ScoredRecord, Tier, TierLabel, assign_tiers, dominant_role};
pub use variants::{concentration_efficiency, pick_representative, representatives};

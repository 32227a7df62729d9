//! tierlist-search — search pipeline and query service.
//!
//! Serves every read as a view over a tiered universe: either the scope's
//! cached snapshot or, for queries that narrow the universe or change the
//! role preferences, a freshly loaded and tiered one.
//!
//! # Pipeline
//!
//! ```text
//! load (store pre-filters) → metrics → tiers → post-filters → sort → count → page
//! ```
//!
//! Pagination is always last; tiering a partial set would shift the
//! percentile cutoffs.

pub mod error;
pub mod pipeline;
pub mod queries;
pub mod service;

pub use error::{SearchError, SearchResult};
pub use pipeline::{SearchPage, SearchQuery, SortField, run_pipeline, search_snapshot};
pub use queries::{
    AttributeStats, TierDistribution, attribute_analysis, representative_view, top_by_attribute,
    top_by_role,
};
pub use service::TierlistService;

//! The search pipeline: post-filter, sort, count, paginate.
//!
//! Metrics and tiers are always computed over the complete candidate
//! universe before anything here runs; pagination is the very last step so
//! that percentile cutoffs never see a partial set.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use tierlist_core::config::SearchConfig;
use tierlist_core::{Record, RecordFilter, RolePreferences};
use tierlist_engine::{ScoredRecord, TierLabel, score_and_tier};

use crate::error::{SearchError, SearchResult};

/// Field a result page is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Efficiency,
    Purity,
    Name,
    Cost,
    PowerScore,
    FighterScore,
    CrafterScore,
    TierValue,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "efficiency" => Ok(SortField::Efficiency),
            "purity" => Ok(SortField::Purity),
            "name" => Ok(SortField::Name),
            "cost" => Ok(SortField::Cost),
            "power_score" | "power" => Ok(SortField::PowerScore),
            "fighter_score" | "fighter" => Ok(SortField::FighterScore),
            "crafter_score" | "crafter" => Ok(SortField::CrafterScore),
            "tier_value" | "tier" => Ok(SortField::TierValue),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

/// A search request. `Default` is "everything, by efficiency, descending".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Pre-filters pushed down to the record store.
    pub filter: RecordFilter,
    pub purity_floor: Option<f64>,
    pub tier_label: Option<TierLabel>,
    pub efficiency_floor: Option<f64>,
    pub sort: SortField,
    pub descending: bool,
    pub skip: usize,
    /// `None` means the configured default page size.
    pub take: Option<usize>,
    /// `None` means the configured preferences.
    pub preferences: Option<RolePreferences>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            filter: RecordFilter::default(),
            purity_floor: None,
            tier_label: None,
            efficiency_floor: None,
            sort: SortField::Efficiency,
            descending: true,
            skip: 0,
            take: None,
            preferences: None,
        }
    }
}

impl SearchQuery {
    /// Whether this query can be answered from the scope-wide snapshot
    /// computed with `configured` preferences.
    pub fn uses_snapshot(&self, configured: RolePreferences) -> bool {
        self.filter.is_empty() && self.preferences.is_none_or(|p| p == configured)
    }

    pub(crate) fn validate(&self) -> SearchResult<()> {
        for (name, floor) in [
            ("purity_floor", self.purity_floor),
            ("efficiency_floor", self.efficiency_floor),
        ] {
            if floor.is_some_and(|f| !f.is_finite()) {
                return Err(SearchError::InvalidQuery(format!("{name} must be finite")));
            }
        }
        if let Some(p) = self.preferences {
            if p.fighter < 0.0 || p.crafter < 0.0 {
                return Err(SearchError::InvalidQuery(
                    "role preferences must be non-negative".into(),
                ));
            }
        }
        Ok(())
    }

    fn page_size(&self, config: &SearchConfig) -> usize {
        self.take
            .unwrap_or(config.default_take)
            .clamp(1, config.max_take.max(1))
    }

    fn keeps(&self, r: &ScoredRecord) -> bool {
        self.purity_floor.is_none_or(|f| r.metrics.purity >= f)
            && self.tier_label.is_none_or(|l| r.tier_label() == l)
            && self.efficiency_floor.is_none_or(|f| r.metrics.efficiency >= f)
    }
}

/// One page of results plus the post-filter match count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<ScoredRecord>,
    pub total: usize,
}

/// Score and tier a freshly loaded universe, then run the query over it.
pub fn run_pipeline(
    records: Vec<Record>,
    query: &SearchQuery,
    preferences: RolePreferences,
    config: &SearchConfig,
) -> SearchResult<SearchPage> {
    let tiered = score_and_tier(records, preferences);
    search_snapshot(&tiered, query, config)
}

/// Post-filter, sort, count and paginate an already tiered collection.
pub fn search_snapshot(
    records: &[ScoredRecord],
    query: &SearchQuery,
    config: &SearchConfig,
) -> SearchResult<SearchPage> {
    query.validate()?;

    let mut matched: Vec<&ScoredRecord> = records.iter().filter(|r| query.keeps(r)).collect();
    matched.sort_by(|a, b| compare(a, b, query.sort, query.descending));

    let total = matched.len();
    let take = query.page_size(config);
    let items: Vec<ScoredRecord> = matched
        .into_iter()
        .skip(query.skip)
        .take(take)
        .cloned()
        .collect();

    debug!(
        universe = records.len(),
        total,
        skip = query.skip,
        take,
        returned = items.len(),
        "search page"
    );
    Ok(SearchPage { items, total })
}

/// Order by `field` (reversed when `descending`), then by ascending id.
pub(crate) fn compare(
    a: &ScoredRecord,
    b: &ScoredRecord,
    field: SortField,
    descending: bool,
) -> Ordering {
    let primary = match field {
        SortField::Efficiency => a.metrics.efficiency.total_cmp(&b.metrics.efficiency),
        SortField::Purity => a.metrics.purity.total_cmp(&b.metrics.purity),
        SortField::Name => a
            .record
            .name
            .to_lowercase()
            .cmp(&b.record.name.to_lowercase()),
        SortField::Cost => a.record.cost.cmp(&b.record.cost),
        SortField::PowerScore => a.metrics.power_score.total_cmp(&b.metrics.power_score),
        SortField::FighterScore => a.metrics.fighter_score.total_cmp(&b.metrics.fighter_score),
        SortField::CrafterScore => a.metrics.crafter_score.total_cmp(&b.metrics.crafter_score),
        SortField::TierValue => a
            .tier_value()
            .unwrap_or(-1.0)
            .total_cmp(&b.tier_value().unwrap_or(-1.0)),
    };
    let primary = if descending { primary.reverse() } else { primary };
    primary.then_with(|| a.record.id.cmp(&b.record.id))
}

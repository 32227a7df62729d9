//! Dataset-relative tier assignment.
//!
//! Tiers only make sense for a whole collection: records are grouped by
//! role dominance, ranked by efficiency against same-role peers, and cut
//! at the 20th and 60th percentiles. Bonus and penalty adjustments are
//! then applied per record and the result clamped into `0.0..=2.0`.
//!
//! Cutoffs are inclusive, so ties straddling a boundary all land in the
//! higher tier and a tier may hold more than its nominal share.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tierlist_core::Record;

use crate::metrics::DerivedMetrics;

/// Role share (percent) above which a record is dominated by that role.
const DOMINANCE_PERCENT: f64 = 60.0;
/// Inclusive band both role shares must lie in for a balanced record.
const BALANCED_BAND: (f64, f64) = (40.0, 60.0);

/// Cost above which a record is penalized.
const COST_PENALTY_THRESHOLD: u32 = 15;

const MAX_TIER_VALUE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Fighter,
    Crafter,
    Universal,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Fighter => "fighter",
            Role::Crafter => "crafter",
            Role::Universal => "universal",
        }
    }

    /// The purity metric that matches this role.
    fn purity(&self, metrics: &DerivedMetrics) -> f64 {
        match self {
            Role::Fighter => metrics.fighter_purity,
            Role::Crafter => metrics.crafter_purity,
            Role::Universal => metrics.universal_purity,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fighter" => Ok(Role::Fighter),
            "crafter" => Ok(Role::Crafter),
            "universal" => Ok(Role::Universal),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierLabel {
    Low,
    Mid,
    Best,
    /// No meaningful tier: a single record, or one outside any collection.
    Unknown,
}

impl TierLabel {
    pub fn label(&self) -> &'static str {
        match self {
            TierLabel::Low => "Low",
            TierLabel::Mid => "Mid",
            TierLabel::Best => "Best",
            TierLabel::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for TierLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(TierLabel::Low),
            "mid" => Ok(TierLabel::Mid),
            "best" => Ok(TierLabel::Best),
            "unknown" => Ok(TierLabel::Unknown),
            other => Err(format!("unknown tier label: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Range: 0.0..=2.0.
    pub value: f64,
    pub label: TierLabel,
}

impl Tier {
    /// Clamp a raw value into range and derive its label.
    pub fn from_value(value: f64) -> Self {
        let value = value.clamp(0.0, MAX_TIER_VALUE);
        let label = if value >= 1.75 {
            TierLabel::Best
        } else if value >= 0.75 {
            TierLabel::Mid
        } else {
            TierLabel::Low
        };
        Self { value, label }
    }
}

/// A record together with its derived metrics and (once tiered) its tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: Record,
    pub metrics: DerivedMetrics,
    pub tier: Option<Tier>,
}

impl ScoredRecord {
    pub fn new(record: Record, metrics: DerivedMetrics) -> Self {
        Self {
            record,
            metrics,
            tier: None,
        }
    }

    pub fn tier_label(&self) -> TierLabel {
        self.tier.map_or(TierLabel::Unknown, |t| t.label)
    }

    pub fn tier_value(&self) -> Option<f64> {
        self.tier.map(|t| t.value)
    }
}

/// Role partition a record belongs to, or `None` when no predicate holds
/// (a record with no fighter or crafter score at all).
pub fn dominant_role(metrics: &DerivedMetrics) -> Option<Role> {
    let (lo, hi) = BALANCED_BAND;
    let balanced = |p: f64| (lo..=hi).contains(&p);

    if metrics.fighter_percent > DOMINANCE_PERCENT {
        Some(Role::Fighter)
    } else if metrics.crafter_percent > DOMINANCE_PERCENT {
        Some(Role::Crafter)
    } else if balanced(metrics.fighter_percent) && balanced(metrics.crafter_percent) {
        Some(Role::Universal)
    } else {
        None
    }
}

/// Assign a tier to every record of the collection, in place.
///
/// Records outside every role partition fall back to a flat `Low` (0.0)
/// with no adjustments, since they have no peers to be ranked against.
pub fn assign_tiers(records: &mut [ScoredRecord]) {
    if records.is_empty() {
        return;
    }

    let mut partitions: HashMap<Role, Vec<usize>> = HashMap::new();
    let mut untiered = 0usize;
    for (idx, r) in records.iter().enumerate() {
        match dominant_role(&r.metrics) {
            Some(role) => partitions.entry(role).or_default().push(idx),
            None => {
                untiered += 1;
            }
        }
    }

    for (role, members) in &partitions {
        let (best_cutoff, mid_cutoff) = cutoffs(records, members);
        for &idx in members {
            let r = &mut records[idx];
            let baseline = baseline_value(r.metrics.efficiency, best_cutoff, mid_cutoff);
            r.tier = Some(Tier::from_value(baseline + adjustment(r, *role)));
        }
        debug!(
            role = role.name(),
            members = members.len(),
            best_cutoff,
            mid_cutoff,
            "tiered partition"
        );
    }

    if untiered > 0 {
        for r in records.iter_mut().filter(|r| r.tier.is_none()) {
            r.tier = Some(Tier::from_value(0.0));
        }
        warn!(untiered, "records outside every role partition defaulted to Low");
    }
}

/// Efficiency cutoffs `(best, mid)` for one partition.
///
/// `best_index = max(0, floor(n * 0.20) - 1)`, `mid_index = max(0, floor(n * 0.60) - 1)`
/// over the partition sorted by descending efficiency.
fn cutoffs(records: &[ScoredRecord], members: &[usize]) -> (f64, f64) {
    let mut efficiencies: Vec<f64> =
        members.iter().map(|&i| records[i].metrics.efficiency).collect();
    efficiencies.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let n = efficiencies.len();
    // Integer forms of floor(n * 0.20) and floor(n * 0.60).
    let best_index = (n / 5).saturating_sub(1);
    let mid_index = (n * 3 / 5).saturating_sub(1);

    (efficiencies[best_index], efficiencies[mid_index])
}

fn baseline_value(efficiency: f64, best_cutoff: f64, mid_cutoff: f64) -> f64 {
    if efficiency >= best_cutoff {
        2.0
    } else if efficiency >= mid_cutoff {
        1.0
    } else {
        0.0
    }
}

/// Summed bonus/penalty for a record ranked within `role`'s partition.
fn adjustment(r: &ScoredRecord, role: Role) -> f64 {
    let mut delta = 0.0;

    let purity = role.purity(&r.metrics);
    if purity >= 0.95 {
        delta += 1.0;
    } else if purity >= 0.85 {
        delta += 0.5;
    } else if purity < 0.50 {
        delta -= 0.5;
    }

    if r.metrics.tier2_count >= 2 {
        delta += 1.0;
    }
    if r.metrics.has_rare_attribute {
        delta += 0.5;
    }
    if r.record.cost > COST_PENALTY_THRESHOLD {
        delta -= 1.0;
    }
    delta
}

//! Per-record derived metrics.
//!
//! Every field of [`DerivedMetrics`] is a pure function of a record's
//! attribute list, cost, and the role preferences. Metrics are recomputed
//! whenever they are needed and never stored alongside the record.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tierlist_core::{Record, RolePreferences};

use crate::categorizer::{AttributeTier, Category, categorize, is_rare};
use crate::tiering::{ScoredRecord, assign_tiers};

/// Share of the universal bucket credited to each role score.
const UNIVERSAL_SHARE: f64 = 0.7;

/// Efficiency multiplier for zero-cost records (no division by zero).
const ZERO_COST_MULTIPLIER: f64 = 1000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Fraction of the total magnitude that is not trash. Range: 0.0..=1.0.
    pub purity: f64,
    pub fighter_purity: f64,
    pub crafter_purity: f64,
    pub universal_purity: f64,
    pub trash_total: f64,
    pub useful_total: f64,
    pub grand_total: f64,
    pub fighter_score: f64,
    pub crafter_score: f64,
    /// Fighter share of the combined role score. Range: 0.0..=100.0.
    pub fighter_percent: f64,
    pub crafter_percent: f64,
    pub power_score: f64,
    /// Power score per unit of cost; the primary ranking metric.
    pub efficiency: f64,
    pub tier2_count: u32,
    pub has_rare_attribute: bool,
    /// Identifiers dropped from scoring because their symbol is unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

#[derive(Default)]
struct Buckets {
    fighter: f64,
    crafter: f64,
    universal: f64,
    raw_fighter: f64,
    raw_crafter: f64,
    raw_universal: f64,
}

/// Compute the derived metrics of one record.
pub fn compute_metrics(record: &Record, prefs: RolePreferences) -> DerivedMetrics {
    let mut m = DerivedMetrics::default();
    let mut b = Buckets::default();

    for contribution in &record.attributes {
        let (category, tier) = categorize(&contribution.identifier);
        let magnitude = contribution.magnitude.to_f64().unwrap_or(0.0);

        let (weighted_bucket, raw_bucket) = match category {
            Category::Unrecognized => {
                warn!(
                    record = %record.id,
                    identifier = %contribution.identifier,
                    "unrecognized attribute dropped from scoring"
                );
                m.unrecognized.push(contribution.identifier.clone());
                continue;
            }
            Category::Trash => {
                m.grand_total += magnitude;
                m.trash_total += magnitude;
                continue;
            }
            Category::Fighter => (&mut b.fighter, &mut b.raw_fighter),
            Category::Crafter => (&mut b.crafter, &mut b.raw_crafter),
            Category::Universal => (&mut b.universal, &mut b.raw_universal),
        };

        m.grand_total += magnitude;
        *weighted_bucket += magnitude * tier.scoring_weight();
        *raw_bucket += magnitude;

        if category == Category::Crafter && is_rare(&contribution.identifier) {
            m.has_rare_attribute = true;
        }
        if tier == AttributeTier::Two {
            m.tier2_count += 1;
        }
    }

    m.useful_total = m.grand_total - m.trash_total;
    m.purity = if m.grand_total > 0.0 {
        (m.useful_total / m.grand_total).clamp(0.0, 1.0)
    } else {
        1.0
    };

    // Shares of the positive role buckets; equals raw / useful_total when nothing is negative.
    let (fighter, crafter, universal) = (
        b.raw_fighter.max(0.0),
        b.raw_crafter.max(0.0),
        b.raw_universal.max(0.0),
    );
    let role_total = fighter + crafter + universal;
    if role_total > 0.0 {
        m.fighter_purity = fighter / role_total;
        m.crafter_purity = crafter / role_total;
        m.universal_purity = universal / role_total;
    }

    m.fighter_score = b.fighter + b.universal * UNIVERSAL_SHARE;
    m.crafter_score = b.crafter + b.universal * UNIVERSAL_SHARE;

    let role_sum = m.fighter_score + m.crafter_score;
    if role_sum != 0.0 {
        m.fighter_percent = m.fighter_score / role_sum * 100.0;
        m.crafter_percent = m.crafter_score / role_sum * 100.0;
    }

    let (fighter_weight, crafter_weight) = prefs.weights();
    m.power_score = m.fighter_score * fighter_weight + m.crafter_score * crafter_weight;

    m.efficiency = if record.cost > 0 {
        m.power_score / f64::from(record.cost)
    } else {
        m.power_score * ZERO_COST_MULTIPLIER
    };

    m
}

/// Compute metrics for every record of a collection. Tiers are left unset.
pub fn score_collection(records: Vec<Record>, prefs: RolePreferences) -> Vec<ScoredRecord> {
    records
        .into_iter()
        .map(|record| {
            let metrics = compute_metrics(&record, prefs);
            ScoredRecord::new(record, metrics)
        })
        .collect()
}

/// Compute metrics for the whole collection, then tier the whole collection.
pub fn score_and_tier(records: Vec<Record>, prefs: RolePreferences) -> Vec<ScoredRecord> {
    let mut scored = score_collection(records, prefs);
    assign_tiers(&mut scored);
    scored
}

//! Concentration-weighted scoring for picking one variant per recipe name.
//!
//! This is a separate formula from the tiering efficiency and is only used
//! to choose a representative among same-named variants. It counts trash,
//! does not split by role, and uses the nominal 2× multiplier for tier-2
//! contributions.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;

use tierlist_core::Record;

use crate::categorizer::categorize;
use crate::tiering::ScoredRecord;

const ZERO_COST_MULTIPLIER: f64 = 1000.0;

/// Expected-value efficiency boosted by how concentrated the record is in
/// its dominant attribute.
///
/// `Σ(magnitude / total × tier_multiplier) / cost × (1 + dominant_share)`
pub fn concentration_efficiency(record: &Record) -> f64 {
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;
    for a in &record.attributes {
        let magnitude = a.magnitude.to_f64().unwrap_or(0.0);
        *groups.entry(a.base_symbol()).or_default() += magnitude;
        total += magnitude;
    }
    if total <= 0.0 {
        return 0.0;
    }

    let dominant = groups.values().copied().fold(f64::MIN, f64::max);
    let dominant_share = dominant / total;

    let expected: f64 = record
        .attributes
        .iter()
        .map(|a| {
            let magnitude = a.magnitude.to_f64().unwrap_or(0.0);
            let (_, tier) = categorize(&a.identifier);
            magnitude / total * tier.nominal_multiplier()
        })
        .sum();

    let per_cost = if record.cost > 0 {
        expected / f64::from(record.cost)
    } else {
        expected * ZERO_COST_MULTIPLIER
    };
    per_cost * (1.0 + dominant_share)
}

/// Highest concentration efficiency wins; ties go to the lowest id.
pub fn pick_representative<'a, I>(variants: I) -> Option<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    variants
        .into_iter()
        .map(|r| (concentration_efficiency(r), r))
        .max_by(|(ea, ra), (eb, rb)| {
            ea.partial_cmp(eb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| rb.id.cmp(&ra.id))
        })
        .map(|(_, r)| r)
}

/// One representative per case-insensitive name, ordered by name.
pub fn representatives(records: &[ScoredRecord]) -> Vec<&ScoredRecord> {
    let mut by_name: BTreeMap<String, Vec<&ScoredRecord>> = BTreeMap::new();
    for r in records {
        by_name.entry(r.record.name.to_lowercase()).or_default().push(r);
    }

    by_name
        .into_values()
        .filter_map(|group| {
            let chosen = pick_representative(group.iter().map(|s| &s.record))?.id;
            group.into_iter().find(|s| s.record.id == chosen)
        })
        .collect()
}

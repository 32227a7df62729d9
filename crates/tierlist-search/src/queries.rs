//! Read-only views over a tiered collection.
//!
//! Each view filters and orders the same tiered universe the search
//! pipeline uses; none of them re-derives tiers over a subset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tierlist_engine::{
    Category, Role, ScoredRecord, TierLabel, dominant_role, known_symbols, representatives,
};

use crate::pipeline::{SortField, compare};

/// Records carrying `symbol` (any tier), strongest contribution first.
///
/// Ordered by the symbol's summed magnitude, then efficiency, both
/// descending, then ascending id.
pub fn top_by_attribute(records: &[ScoredRecord], symbol: &str, limit: usize) -> Vec<ScoredRecord> {
    let mut carrying: Vec<(Decimal, &ScoredRecord)> = records
        .iter()
        .filter(|r| r.record.has_attribute(symbol))
        .map(|r| (r.record.magnitude_of(symbol), r))
        .collect();
    carrying.sort_by(|(ma, a), (mb, b)| {
        mb.cmp(ma)
            .then_with(|| compare(a, b, SortField::Efficiency, true))
    });
    carrying.into_iter().take(limit).map(|(_, r)| r.clone()).collect()
}

/// Records in `role`'s tiering partition, most efficient first.
pub fn top_by_role(records: &[ScoredRecord], role: Role, limit: usize) -> Vec<ScoredRecord> {
    let mut members: Vec<&ScoredRecord> = records
        .iter()
        .filter(|r| dominant_role(&r.metrics) == Some(role))
        .collect();
    members.sort_by(|a, b| compare(a, b, SortField::Efficiency, true));
    members.into_iter().take(limit).cloned().collect()
}

/// Count of records per tier label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub low: usize,
    pub mid: usize,
    pub best: usize,
    pub unknown: usize,
}

impl TierDistribution {
    fn add(&mut self, label: TierLabel) {
        match label {
            TierLabel::Low => self.low += 1,
            TierLabel::Mid => self.mid += 1,
            TierLabel::Best => self.best += 1,
            TierLabel::Unknown => self.unknown += 1,
        }
    }
}

/// Aggregate statistics for one attribute symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeStats {
    pub symbol: String,
    pub category: Category,
    /// Records carrying the symbol at any tier.
    pub records: usize,
    pub average_magnitude: Decimal,
    /// Mean tiering efficiency of the carrying records.
    pub average_efficiency: f64,
    pub tiers: TierDistribution,
}

/// Per-symbol statistics for every recognized symbol, in table order.
/// Symbols nobody carries are reported with zero counts.
pub fn attribute_analysis(records: &[ScoredRecord]) -> Vec<AttributeStats> {
    known_symbols()
        .map(|(symbol, category)| {
            let mut count = 0usize;
            let mut magnitude = Decimal::ZERO;
            let mut efficiency = 0.0;
            let mut tiers = TierDistribution::default();

            for r in records.iter().filter(|r| r.record.has_attribute(symbol)) {
                count += 1;
                magnitude += r.record.magnitude_of(symbol);
                efficiency += r.metrics.efficiency;
                tiers.add(r.tier_label());
            }

            let (average_magnitude, average_efficiency) = if count > 0 {
                (
                    magnitude / Decimal::from(count as u64),
                    efficiency / count as f64,
                )
            } else {
                (Decimal::ZERO, 0.0)
            };

            AttributeStats {
                symbol: symbol.to_string(),
                category,
                records: count,
                average_magnitude,
                average_efficiency,
                tiers,
            }
        })
        .collect()
}

/// One variant per case-insensitive name, ordered by name.
pub fn representative_view(records: &[ScoredRecord]) -> Vec<ScoredRecord> {
    representatives(records).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tierlist_core::{AttributeContribution, Record, RecordId, RolePreferences, Scope};
    use tierlist_engine::score_and_tier;

    fn make(id: u64, name: &str, attrs: &[(&str, Decimal)], cost: u32) -> Record {
        Record {
            id: RecordId(id),
            name: name.to_string(),
            scope: Scope::from("public"),
            ingredients: Vec::new(),
            attributes: attrs
                .iter()
                .map(|(i, m)| AttributeContribution::new(*i, *m))
                .collect(),
            cost,
        }
    }

    fn collection() -> Vec<ScoredRecord> {
        score_and_tier(
            vec![
                make(1, "steak", &[("STR", dec!(1.0))], 4),
                make(2, "jerky", &[("STR+2", dec!(0.5)), ("STR", dec!(1.0))], 4),
                make(3, "broth", &[("STR", dec!(0.5))], 1),
                make(4, "tea", &[("INT", dec!(1.0))], 2),
                make(5, "tea", &[("INT", dec!(1.0)), ("LCK", dec!(0.5))], 2),
                make(6, "bread", &[("STR", dec!(0.5)), ("INT", dec!(0.5))], 2),
            ],
            RolePreferences::default(),
        )
    }

    fn ids(records: &[ScoredRecord]) -> Vec<u64> {
        records.iter().map(|r| r.record.id.0).collect()
    }

    #[test]
    fn top_by_attribute_orders_by_summed_magnitude() {
        let top = top_by_attribute(&collection(), "str", 10);
        // jerky 1.5, steak 1.0, then broth and bread tie on magnitude and efficiency.
        assert_eq!(ids(&top), vec![2, 1, 3, 6]);
    }

    #[test]
    fn top_by_attribute_respects_limit() {
        assert_eq!(top_by_attribute(&collection(), "STR", 2).len(), 2);
        assert!(top_by_attribute(&collection(), "DEX", 5).is_empty());
    }

    #[test]
    fn top_by_role_uses_tiering_partitions() {
        let all = collection();
        let fighters = top_by_role(&all, Role::Fighter, 10);
        assert_eq!(ids(&fighters), vec![3, 2, 1]);

        let universal = top_by_role(&all, Role::Universal, 10);
        assert_eq!(ids(&universal), vec![6]);

        let crafters = top_by_role(&all, Role::Crafter, 1);
        assert_eq!(ids(&crafters), vec![5]);
    }

    #[test]
    fn analysis_covers_every_known_symbol() {
        let stats = attribute_analysis(&collection());
        assert_eq!(stats.len(), known_symbols().count());

        let str_stats = stats.iter().find(|s| s.symbol == "STR").unwrap();
        assert_eq!(str_stats.category, Category::Fighter);
        assert_eq!(str_stats.records, 4);
        // (1.0 + 1.5 + 0.5 + 0.5) / 4
        assert_eq!(str_stats.average_magnitude, dec!(0.875));
        let tiered = str_stats.tiers.low + str_stats.tiers.mid + str_stats.tiers.best;
        assert_eq!(tiered, 4);

        let cha = stats.iter().find(|s| s.symbol == "CHA").unwrap();
        assert_eq!(cha.records, 0);
        assert_eq!(cha.average_efficiency, 0.0);
    }

    #[test]
    fn representative_view_picks_one_per_name() {
        let reps = representative_view(&collection());
        let names: Vec<&str> = reps.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["bread", "broth", "jerky", "steak", "tea"]);
        let tea = reps.iter().find(|r| r.record.name == "tea").unwrap();
        assert_eq!(tea.record.id, RecordId(4));
    }
}

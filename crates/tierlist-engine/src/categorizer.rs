//! Attribute identifier classification.
//!
//! An identifier is a base symbol with an optional `+<tier>` suffix
//! (`AGI`, `agi+1`, `AGI+2`). Only an explicit `+2` marks tier 2.

use serde::{Deserialize, Serialize};

use tierlist_core::split_identifier;

const FIGHTER_SYMBOLS: [&str; 3] = ["STR", "AGI", "DEX"];
const CRAFTER_SYMBOLS: [&str; 3] = ["INT", "WIS", "LCK"];
const UNIVERSAL_SYMBOLS: [&str; 2] = ["VIT", "END"];
const TRASH_SYMBOLS: [&str; 1] = ["CHA"];

/// The crafter symbol that earns the rare-attribute bonus.
pub const RARE_SYMBOL: &str = "LCK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Fighter,
    Crafter,
    Universal,
    Trash,
    Unrecognized,
}

/// Multiplier class of a single contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeTier {
    One,
    Two,
}

impl AttributeTier {
    /// Weight applied to the magnitude by the metrics calculator.
    pub fn scoring_weight(self) -> f64 {
        match self {
            AttributeTier::One => 1.0,
            AttributeTier::Two => 1.5,
        }
    }

    /// Nominal stat-gain multiplier, used by the variant scorer.
    pub fn nominal_multiplier(self) -> f64 {
        match self {
            AttributeTier::One => 1.0,
            AttributeTier::Two => 2.0,
        }
    }
}

/// Classify an identifier into its category and tier. Case-insensitive.
pub fn categorize(identifier: &str) -> (Category, AttributeTier) {
    let (base, suffix) = split_identifier(identifier);
    let tier = match suffix {
        Some("2") => AttributeTier::Two,
        _ => AttributeTier::One,
    };
    (category_of_symbol(base), tier)
}

/// Category of a bare base symbol (no suffix).
pub fn category_of_symbol(symbol: &str) -> Category {
    let is = |table: &[&str]| table.iter().any(|s| s.eq_ignore_ascii_case(symbol));
    if is(&FIGHTER_SYMBOLS) {
        Category::Fighter
    } else if is(&CRAFTER_SYMBOLS) {
        Category::Crafter
    } else if is(&UNIVERSAL_SYMBOLS) {
        Category::Universal
    } else if is(&TRASH_SYMBOLS) {
        Category::Trash
    } else {
        Category::Unrecognized
    }
}

/// Whether the identifier names the rare crafter attribute.
pub fn is_rare(identifier: &str) -> bool {
    split_identifier(identifier).0.eq_ignore_ascii_case(RARE_SYMBOL)
}

/// Every recognized symbol with its category, in table order.
pub fn known_symbols() -> impl Iterator<Item = (&'static str, Category)> {
    FIGHTER_SYMBOLS
        .iter()
        .map(|s| (*s, Category::Fighter))
        .chain(CRAFTER_SYMBOLS.iter().map(|s| (*s, Category::Crafter)))
        .chain(UNIVERSAL_SYMBOLS.iter().map(|s| (*s, Category::Universal)))
        .chain(TRASH_SYMBOLS.iter().map(|s| (*s, Category::Trash)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_table() {
        assert_eq!(categorize("STR").0, Category::Fighter);
        assert_eq!(categorize("dex+1").0, Category::Fighter);
        assert_eq!(categorize("Wis").0, Category::Crafter);
        assert_eq!(categorize("END+2").0, Category::Universal);
        assert_eq!(categorize("cha").0, Category::Trash);
    }

    #[test]
    fn unknown_symbols_are_unrecognized() {
        assert_eq!(categorize("MANA+1").0, Category::Unrecognized);
        assert_eq!(categorize("").0, Category::Unrecognized);
        assert_eq!(categorize("+2").0, Category::Unrecognized);
    }

    #[test]
    fn only_plus_two_is_tier_two() {
        assert_eq!(categorize("AGI+2").1, AttributeTier::Two);
        assert_eq!(categorize("AGI + 2").1, AttributeTier::Two);
        assert_eq!(categorize("AGI+1").1, AttributeTier::One);
        assert_eq!(categorize("AGI+3").1, AttributeTier::One);
        assert_eq!(categorize("AGI").1, AttributeTier::One);
    }

    #[test]
    fn rare_detection_ignores_tier_and_case() {
        assert!(is_rare("lck+2"));
        assert!(is_rare("LCK"));
        assert!(!is_rare("INT+2"));
    }

    #[test]
    fn known_symbols_covers_nine_entries() {
        let all: Vec<_> = known_symbols().collect();
        assert_eq!(all.len(), 9);
        assert!(all.iter().all(|(s, c)| category_of_symbol(s) == *c));
    }
}

//! Shared types used across Tierlist crates.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unique identifier for a recipe record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility scope (tenant, owner, or "public"). Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(pub String);

impl Scope {
    pub fn new(scope: impl Into<String>) -> Self {
        Self(scope.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One stat-bonus entry on a record, e.g. `AGI+2` with magnitude `0.2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeContribution {
    /// Raw identifier: a base symbol with an optional `+<tier>` suffix.
    pub identifier: String,
    pub magnitude: Decimal,
}

impl AttributeContribution {
    pub fn new(identifier: impl Into<String>, magnitude: Decimal) -> Self {
        Self {
            identifier: identifier.into(),
            magnitude,
        }
    }

    /// Upper-cased base symbol with any `+<tier>` suffix removed.
    pub fn base_symbol(&self) -> String {
        split_identifier(&self.identifier).0.to_ascii_uppercase()
    }
}

/// Split an attribute identifier into its base symbol and optional tier suffix.
///
/// `"agi+2"` → `("agi", Some("2"))`, `" STR "` → `("STR", None)`.
pub fn split_identifier(identifier: &str) -> (&str, Option<&str>) {
    let trimmed = identifier.trim();
    match trimmed.split_once('+') {
        Some((base, suffix)) => (base.trim(), Some(suffix.trim())),
        None => (trimmed, None),
    }
}

/// A recipe record as supplied by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub scope: Scope,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub attributes: Vec<AttributeContribution>,
    /// Hunger cost. Zero-cost records are incomplete data and never leave the store.
    pub cost: u32,
}

impl Record {
    /// Summed magnitude of every contribution whose base symbol matches `symbol`.
    pub fn magnitude_of(&self, symbol: &str) -> Decimal {
        self.attributes
            .iter()
            .filter(|a| a.base_symbol().eq_ignore_ascii_case(symbol))
            .map(|a| a.magnitude)
            .sum()
    }

    pub fn has_attribute(&self, symbol: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.base_symbol().eq_ignore_ascii_case(symbol))
    }
}

/// Pre-filters pushed down to the record store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring of the record name.
    pub text: Option<String>,
    /// Case-insensitive substring of any ingredient.
    pub ingredient: Option<String>,
    /// Base attribute symbol that must be present (any tier).
    pub attribute: Option<String>,
    /// Inclusive upper bound on cost.
    pub cost_ceiling: Option<u32>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.ingredient.is_none()
            && self.attribute.is_none()
            && self.cost_ceiling.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if let Some(text) = &self.text {
            if !contains_ignore_case(&record.name, text) {
                return false;
            }
        }
        if let Some(ingredient) = &self.ingredient {
            if !record
                .ingredients
                .iter()
                .any(|i| contains_ignore_case(i, ingredient))
            {
                return false;
            }
        }
        if let Some(symbol) = &self.attribute {
            if !record.has_attribute(symbol) {
                return false;
            }
        }
        if let Some(ceiling) = self.cost_ceiling {
            if record.cost > ceiling {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Relative weighting of the fighter and crafter role scores in the power score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RolePreferences {
    pub fighter: f64,
    pub crafter: f64,
}

impl Default for RolePreferences {
    fn default() -> Self {
        Self {
            fighter: 0.5,
            crafter: 0.5,
        }
    }
}

impl RolePreferences {
    pub fn new(fighter: f64, crafter: f64) -> Self {
        Self { fighter, crafter }
    }

    /// Normalized `(fighter, crafter)` weights summing to 1.
    ///
    /// A non-positive or non-finite sum falls back to an even split.
    pub fn weights(&self) -> (f64, f64) {
        let sum = self.fighter + self.crafter;
        if sum > 0.0 && sum.is_finite() {
            (self.fighter / sum, self.crafter / sum)
        } else {
            (0.5, 0.5)
        }
    }
}

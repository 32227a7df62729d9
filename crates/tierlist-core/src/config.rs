//! tierlist.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::RolePreferences;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TierlistConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tierlist.redb"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Lifetime of a computed snapshot, in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    pub fighter_preference: f64,
    pub crafter_preference: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let prefs = RolePreferences::default();
        Self {
            fighter_preference: prefs.fighter,
            crafter_preference: prefs.crafter,
        }
    }
}

impl ScoringConfig {
    pub fn preferences(&self) -> RolePreferences {
        RolePreferences::new(self.fighter_preference, self.crafter_preference)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Page size used when a query does not specify one.
    pub default_take: usize,
    /// Upper bound on any requested page size.
    pub max_take: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_take: 50,
            max_take: 500,
        }
    }
}

impl TierlistConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TierlistConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let s = &self.scoring;
        if s.fighter_preference < 0.0 || s.crafter_preference < 0.0 {
            anyhow::bail!("scoring preferences must be non-negative");
        }
        if self.search.max_take == 0 {
            anyhow::bail!("search.max_take must be at least 1");
        }
        Ok(())
    }
}

pub mod config;
pub mod import;
pub mod output;
pub mod query;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use tierlist_cache::MemoryCacheStore;
use tierlist_core::TierlistConfig;
use tierlist_search::TierlistService;
use tierlist_state::StateStore;

pub use output::Output;

const DEFAULT_CONFIG_FILE: &str = "tierlist.toml";

/// An opened store wired into the query service.
pub struct Context {
    pub service: TierlistService,
    pub config: TierlistConfig,
}

impl Context {
    pub fn open(config_path: Option<&Path>, db: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = load_config(config_path, db)?;
        Self::with_config(config)
    }

    pub fn with_config(config: TierlistConfig) -> anyhow::Result<Self> {
        let path = &config.store.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let store = StateStore::open(path)?;
        info!(path = %path.display(), "record store opened");

        let service =
            TierlistService::new(Arc::new(store), Arc::new(MemoryCacheStore::new()), &config);
        Ok(Self { service, config })
    }
}

/// Explicit `--config`, else `./tierlist.toml` when present, else defaults.
/// `--db` always wins over the configured store path.
pub fn load_config(explicit: Option<&Path>, db: Option<PathBuf>) -> anyhow::Result<TierlistConfig> {
    let mut config = match explicit {
        Some(path) => TierlistConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            TierlistConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => TierlistConfig::default(),
    };
    if let Some(db) = db {
        config.store.path = db;
    }
    debug!(
        store = %config.store.path.display(),
        ttl_secs = config.cache.ttl_secs,
        "configuration loaded"
    );
    Ok(config)
}

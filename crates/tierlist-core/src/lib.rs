pub mod config;
pub mod types;

pub use config::TierlistConfig;
pub use types::*;

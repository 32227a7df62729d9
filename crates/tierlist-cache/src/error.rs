//! Cache error types.

use thiserror::Error;

/// Errors that can occur while serving or rebuilding a snapshot.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("record store error: {0}")]
    Store(#[from] tierlist_state::StateError),

    #[error("snapshot load cancelled")]
    Cancelled,
}

pub type CacheResult<T> = Result<T, CacheError>;

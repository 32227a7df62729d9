//! Search error types.

use thiserror::Error;

use tierlist_cache::CacheError;
use tierlist_core::RecordId;
use tierlist_state::StateError;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("record store error: {0}")]
    Store(#[from] StateError),

    #[error("cache error: {0}")]
    Cache(CacheError),

    #[error("search cancelled")]
    Cancelled,

    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl SearchError {
    /// Whether the caller may reasonably retry. Nothing in the pipeline
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::Store(_) | SearchError::Cache(_))
    }
}

impl From<CacheError> for SearchError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Cancelled => SearchError::Cancelled,
            CacheError::Store(inner) => SearchError::Store(inner),
            other => SearchError::Cache(other),
        }
    }
}

pub type SearchResult<T> = Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_errors_are_unwrapped() {
        assert!(matches!(SearchError::from(CacheError::Cancelled), SearchError::Cancelled));
        let store = CacheError::Store(StateError::Unavailable("down".into()));
        assert!(matches!(SearchError::from(store), SearchError::Store(_)));
    }

    #[test]
    fn only_backend_failures_are_retryable() {
        assert!(SearchError::Store(StateError::Read("io".into())).is_retryable());
        assert!(SearchError::Cache(CacheError::Backend("gone".into())).is_retryable());
        assert!(!SearchError::Cancelled.is_retryable());
        assert!(!SearchError::NotFound(RecordId(7)).is_retryable());
        assert!(!SearchError::InvalidQuery("take".into()).is_retryable());
    }
}

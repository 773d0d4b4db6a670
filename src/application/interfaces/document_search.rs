use async_trait::async_trait;

use crate::domain::{DomainError, SearchResult};

/// Searches a cloud document store for related reference material.
///
/// Optional source: an `Unavailable` error is non-fatal to a run and the
/// orchestrator proceeds with an empty result sequence.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, DomainError>;
}

use async_trait::async_trait;

use crate::domain::{DomainError, SearchResult};

/// Nearest-neighbor search over an internal vector knowledge base.
///
/// Implementations derive keyword candidates from the repository identifier
/// before embedding (see `connector::adapter::keywords`). Each result carries
/// a similarity score and the collection it came from.
///
/// Optional source: `Embedding` and `Index` errors are non-fatal and the
/// orchestrator proceeds with an empty result set.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    async fn search(&self, identifier: &str) -> Result<Vec<SearchResult>, DomainError>;
}

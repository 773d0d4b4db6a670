use async_trait::async_trait;

use crate::domain::DomainError;

/// One nearest-neighbor hit from the vector index.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub text: String,
    pub score: f32,
}

/// Similarity search over a named collection of embedded documents.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Errors with `Index` when the store is unavailable or the collection
    /// cannot be read.
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexHit>, DomainError>;

    fn collections(&self) -> Vec<String>;
}

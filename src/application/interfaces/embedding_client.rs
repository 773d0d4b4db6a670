use async_trait::async_trait;

use crate::domain::DomainError;

/// Generates a vector embedding for one query string.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Errors with `Embedding` when the embedding service is unreachable or
    /// returns an invalid payload.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;
}

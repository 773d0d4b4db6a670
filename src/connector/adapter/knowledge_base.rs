use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::application::{EmbeddingClient, KnowledgeSearch, VectorIndex};
use crate::connector::adapter::keywords::extract_keywords;
use crate::domain::{DomainError, SearchResult};

const DEFAULT_TOP_K: usize = 5;

/// [`KnowledgeSearch`] over an embedding client and a vector index.
///
/// Keyword candidates are derived from the repository identifier by the pure
/// `keywords` module. A candidate whose fragment maps to a collection present
/// in the index searches only that collection; a fallback candidate (last
/// path segment) searches every collection. Results are merged and ranked by
/// similarity.
pub struct KnowledgeBaseConnector {
    embedding: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl KnowledgeBaseConnector {
    pub fn new(embedding: Arc<dyn EmbeddingClient>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            embedding,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl KnowledgeSearch for KnowledgeBaseConnector {
    async fn search(&self, identifier: &str) -> Result<Vec<SearchResult>, DomainError> {
        let candidates = extract_keywords(identifier);
        let known = self.index.collections();
        debug!(
            "Knowledge-base search for {identifier}: {} keyword candidates",
            candidates.len()
        );

        let mut results: Vec<SearchResult> = Vec::new();
        for candidate in candidates {
            let vector = self.embedding.embed(&candidate.keyword).await?;

            let collections: Vec<String> = if known.contains(&candidate.collection) {
                vec![candidate.collection.clone()]
            } else {
                known.clone()
            };

            for collection in collections {
                let hits = self.index.query(&collection, &vector, self.top_k).await?;
                results.extend(hits.into_iter().map(|hit| {
                    SearchResult::knowledge_base(
                        collection.clone(),
                        candidate.keyword.clone(),
                        hit.text,
                        hit.score,
                    )
                }));
            }
        }

        results.sort_by(|a, b| {
            b.score()
                .unwrap_or(0.0)
                .total_cmp(&a.score().unwrap_or(0.0))
        });
        results.truncate(self.top_k);

        info!(
            "Knowledge-base search for {identifier} returned {} results",
            results.len()
        );
        Ok(results)
    }
}

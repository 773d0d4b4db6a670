use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::application::{IndexHit, VectorIndex};
use crate::domain::DomainError;

#[derive(Deserialize)]
struct IndexRecord {
    collection: String,
    text: String,
    vector: Vec<f32>,
}

/// [`VectorIndex`] over a JSON index file loaded fully into memory.
///
/// The file is an array of `{collection, text, vector}` records; queries run
/// a cosine-similarity scan over one collection. Suited to the small curated
/// knowledge bases this pipeline searches; there is no persistence beyond
/// the file itself.
#[derive(Debug)]
pub struct FileVectorIndex {
    collections: BTreeMap<String, Vec<(String, Vec<f32>)>>,
}

impl FileVectorIndex {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::index(format!("cannot read vector index {}: {e}", path.display()))
        })?;
        let records: Vec<IndexRecord> = serde_json::from_str(&raw)
            .map_err(|e| DomainError::index(format!("invalid vector index file: {e}")))?;

        let mut collections: BTreeMap<String, Vec<(String, Vec<f32>)>> = BTreeMap::new();
        for record in records {
            collections
                .entry(record.collection)
                .or_default()
                .push((record.text, record.vector));
        }

        info!(
            "Loaded vector index from {} ({} collections)",
            path.display(),
            collections.len()
        );
        Ok(Self { collections })
    }
}

#[async_trait]
impl VectorIndex for FileVectorIndex {
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexHit>, DomainError> {
        let records = self.collections.get(collection).ok_or_else(|| {
            DomainError::index(format!("unknown collection '{collection}'"))
        })?;

        let mut hits: Vec<IndexHit> = records
            .iter()
            .map(|(text, stored)| IndexHit {
                text: text.clone(),
                score: cosine_similarity(vector, stored),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    fn collections(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_index(records: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(records.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn query_ranks_by_similarity() {
        let file = write_index(
            r#"[
                {"collection": "genie", "text": "close match", "vector": [1.0, 0.0]},
                {"collection": "genie", "text": "far match", "vector": [0.0, 1.0]},
                {"collection": "dge", "text": "other collection", "vector": [1.0, 0.0]}
            ]"#,
        );
        let index = FileVectorIndex::load(file.path()).unwrap();

        let hits = index.query("genie", &[1.0, 0.1], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "close match");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn unknown_collection_is_an_index_error() {
        let file = write_index(r#"[]"#);
        let index = FileVectorIndex::load(file.path()).unwrap();
        let err = index.query("missing", &[1.0], 3).await.unwrap_err();
        assert!(matches!(err, DomainError::Index(_)));
    }

    #[test]
    fn missing_file_is_an_index_error() {
        let err = FileVectorIndex::load("/nonexistent/index.json").unwrap_err();
        assert!(matches!(err, DomainError::Index(_)));
    }

    #[test]
    fn collections_are_listed_sorted() {
        let file = write_index(
            r#"[
                {"collection": "genie", "text": "a", "vector": [1.0]},
                {"collection": "dge", "text": "b", "vector": [1.0]}
            ]"#,
        );
        let index = FileVectorIndex::load(file.path()).unwrap();
        assert_eq!(index.collections(), vec!["dge", "genie"]);
    }
}

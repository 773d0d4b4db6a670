use async_trait::async_trait;

use crate::domain::{CodeSnippet, DomainError};

/// Bounds for a code Q&A directory fetch.
#[derive(Debug, Clone, Copy)]
pub struct CodeFetchLimits {
    pub max_files: usize,
    pub max_lines_per_file: usize,
}

impl Default for CodeFetchLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_lines_per_file: 1000,
        }
    }
}

/// Recursively lists a directory and fetches recognized source files.
#[async_trait]
pub trait CodeReader: Send + Sync {
    /// Traversal is depth-first: candidate paths are sorted lexicographically
    /// before the `max_files` cap is applied, so each directory is exhausted
    /// before a sibling directory's subtree is entered. This tie-break decides
    /// which files are dropped once the cap is reached and must stay stable.
    ///
    /// Each file's content is truncated to `max_lines_per_file` lines with a
    /// truncation marker appended when exceeded. Returns `NotFound` when the
    /// directory yields no matching files.
    async fn fetch_directory_code(
        &self,
        identifier: &str,
        directory: &str,
        limits: CodeFetchLimits,
    ) -> Result<Vec<CodeSnippet>, DomainError>;
}

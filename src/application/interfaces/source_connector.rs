use async_trait::async_trait;

use crate::domain::{CodeSnippet, CommitSummary, DomainError, FileEntry, RepositoryDescriptor};

/// Everything the mandatory source stage fetches for one repository.
///
/// All file and commit references are rendered as fully-qualified browsable
/// URLs before leaving the connector; callers never see raw API paths.
#[derive(Debug)]
pub struct RepositoryData {
    pub descriptor: RepositoryDescriptor,
    pub files: Vec<FileEntry>,
    pub commits: Vec<CommitSummary>,
    /// README text, possibly empty when the repository has none.
    pub readme: String,
    /// Snippets extracted from the entry-point filename allow-list.
    pub snippets: Vec<CodeSnippet>,
}

/// Fetches metadata, file structure, commits, README, and entry-point
/// snippets from a hosted VCS API.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Errors: `Authentication` on an invalid or expired credential,
    /// `NotFound` when the identifier does not resolve to an accessible
    /// repository, `RateLimit` when the upstream signals throttling.
    /// None of these are retried here; the caller surfaces them.
    async fn fetch_repository_data(&self, identifier: &str)
        -> Result<RepositoryData, DomainError>;
}

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::application::{CodeFetchLimits, CodeReader, RepositoryData, SourceConnector};
use crate::domain::{
    CodeSnippet, CommitSummary, DomainError, EntryKind, FileEntry, RepositoryDescriptor,
};

const API_VERSION: &str = "2022-11-28";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level listing is capped at this many entries.
const MAX_LISTING_ENTRIES: usize = 20;
/// Number of recent commits fetched.
const COMMIT_LIMIT: usize = 5;
/// Entry-point snippet caps, matching the learning-path preview size.
const MAX_SNIPPETS: usize = 3;
const SNIPPET_PREFIX_BYTES: usize = 300;
/// README text is cut at this many bytes before entering the context.
const README_MAX_BYTES: usize = 1000;

/// Entry-point filenames probed for learning-path snippets, in priority order.
const ENTRY_POINT_FILES: &[&str] = &[
    "main.py",
    "app.py",
    "__init__.py",
    "setup.py",
    "requirements.txt",
    "Dockerfile",
    "docker-compose.yml",
    "config.py",
    "settings.py",
    "package.json",
    "index.js",
    "index.ts",
];

/// Extensions recognized as source files by the code Q&A walk.
const SOURCE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".kt", ".scala", ".go", ".rs", ".rb", ".php",
    ".c", ".cpp", ".h", ".hpp", ".cs", ".swift", ".m", ".sql", ".sh", ".bash", ".yaml", ".yml",
    ".json", ".toml", ".md", ".rst", ".txt", ".html", ".css", ".scss",
];

#[derive(Deserialize)]
struct RepoInfoResponse {
    name: String,
    full_name: String,
    description: Option<String>,
    default_branch: Option<String>,
    private: bool,
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
    #[serde(default)]
    topics: Vec<String>,
    html_url: String,
    language: Option<String>,
    license: Option<LicenseInfo>,
    pushed_at: Option<String>,
}

#[derive(Deserialize)]
struct LicenseInfo {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ContentsItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct FileContentResponse {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct CommitItem {
    sha: String,
    html_url: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// HTTP client for the GitHub REST API (v3).
///
/// Implements both [`SourceConnector`] (metadata, listing, commits, README,
/// entry-point snippets) and [`CodeReader`] (recursive directory fetch via
/// the git trees API). Every reference returned to callers is a browsable
/// `html_url`, never a raw API path.
pub struct GithubClient {
    client: reqwest::Client,
    api_url: String,
    web_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(
        token: impl Into<String>,
        api_url: impl Into<String>,
        web_url: impl Into<String>,
    ) -> Self {
        let api: String = api_url.into();
        let web: String = web_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: api.trim_end_matches('/').to_string(),
            web_url: web.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn blob_url(&self, identifier: &str, branch: &str, path: &str) -> String {
        format!("{}/{identifier}/blob/{branch}/{path}", self.web_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T, DomainError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| DomainError::unavailable(format!("GitHub request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, what));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::internal(format!("failed to parse {what} response: {e}")))
    }

    async fn fetch_repo_info(&self, identifier: &str) -> Result<RepoInfoResponse, DomainError> {
        let url = format!("{}/repos/{identifier}", self.api_url);
        self.get_json(&url, &[], "repository info").await
    }

    async fn fetch_listing(
        &self,
        identifier: &str,
    ) -> Result<Vec<FileEntry>, DomainError> {
        let url = format!("{}/repos/{identifier}/contents/", self.api_url);
        let items: Vec<ContentsItem> = self.get_json(&url, &[], "file structure").await?;
        Ok(items
            .into_iter()
            .take(MAX_LISTING_ENTRIES)
            .map(|item| {
                let html_url = item
                    .html_url
                    .unwrap_or_else(|| format!("{}/{identifier}", self.web_url));
                FileEntry::new(
                    item.name,
                    item.path,
                    EntryKind::parse(&item.kind),
                    item.size,
                    html_url,
                )
            })
            .collect())
    }

    async fn fetch_commits(&self, identifier: &str) -> Result<Vec<CommitSummary>, DomainError> {
        let url = format!("{}/repos/{identifier}/commits", self.api_url);
        let per_page = COMMIT_LIMIT.to_string();
        let items: Vec<CommitItem> = self
            .get_json(&url, &[("per_page", per_page.as_str())], "commits")
            .await?;
        Ok(items
            .into_iter()
            .map(|item| {
                let (author_name, author_date) = item
                    .commit
                    .author
                    .map(|a| (a.name.unwrap_or_default(), a.date.unwrap_or_default()))
                    .unwrap_or_default();
                CommitSummary::new(
                    item.sha,
                    &item.commit.message,
                    author_name,
                    author_date,
                    item.html_url,
                )
            })
            .collect())
    }

    /// Fetch the README; a missing README is an empty string, not an error.
    async fn fetch_readme(&self, identifier: &str) -> Result<String, DomainError> {
        let url = format!("{}/repos/{identifier}/readme", self.api_url);
        match self
            .get_json::<FileContentResponse>(&url, &[], "readme")
            .await
        {
            Ok(file) => {
                let text = decode_base64_content(&file.content)?;
                Ok(truncate_bytes(&text, README_MAX_BYTES))
            }
            Err(e) if e.is_not_found() => {
                debug!("No README in {identifier}");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_file_content(
        &self,
        identifier: &str,
        path: &str,
        branch: &str,
    ) -> Result<String, DomainError> {
        let url = format!("{}/repos/{identifier}/contents/{path}", self.api_url);
        let file: FileContentResponse =
            self.get_json(&url, &[("ref", branch)], "file content").await?;
        decode_base64_content(&file.content)
    }

    /// Short previews from entry-point files present in the top-level
    /// listing, in allow-list priority order, capped at [`MAX_SNIPPETS`].
    async fn fetch_entry_point_snippets(
        &self,
        identifier: &str,
        branch: &str,
        listing: &[FileEntry],
    ) -> Vec<CodeSnippet> {
        let mut snippets = Vec::new();
        for filename in ENTRY_POINT_FILES {
            if snippets.len() >= MAX_SNIPPETS {
                break;
            }
            if !listing
                .iter()
                .any(|e| !e.is_directory() && e.name() == *filename)
            {
                continue;
            }
            match self.fetch_file_content(identifier, filename, branch).await {
                Ok(content) => {
                    snippets.push(CodeSnippet::from_prefix(
                        (*filename).to_string(),
                        &content,
                        SNIPPET_PREFIX_BYTES,
                        self.blob_url(identifier, branch, filename),
                    ));
                    debug!("Fetched entry-point snippet {filename}");
                }
                Err(e) => warn!("Skipping snippet {filename}: {e}"),
            }
        }
        snippets
    }
}

#[async_trait]
impl SourceConnector for GithubClient {
    async fn fetch_repository_data(
        &self,
        identifier: &str,
    ) -> Result<RepositoryData, DomainError> {
        info!("Fetching repository data for {identifier}");

        let repo_info = self.fetch_repo_info(identifier).await?;
        let branch = repo_info
            .default_branch
            .clone()
            .unwrap_or_else(|| "main".to_string());

        let files = self.fetch_listing(identifier).await?;
        let commits = self.fetch_commits(identifier).await?;
        let readme = self.fetch_readme(identifier).await?;
        let snippets = self
            .fetch_entry_point_snippets(identifier, &branch, &files)
            .await;

        let descriptor = RepositoryDescriptor::new(
            repo_info.full_name,
            repo_info.name,
            repo_info.description,
            branch,
            if repo_info.private {
                "private".to_string()
            } else {
                "public".to_string()
            },
            repo_info.license.and_then(|l| l.name),
            repo_info.language,
            repo_info.topics,
            repo_info.stargazers_count,
            repo_info.forks_count,
            repo_info.open_issues_count,
            repo_info.html_url,
            repo_info.pushed_at,
        );

        Ok(RepositoryData {
            descriptor,
            files,
            commits,
            readme,
            snippets,
        })
    }
}

#[async_trait]
impl CodeReader for GithubClient {
    async fn fetch_directory_code(
        &self,
        identifier: &str,
        directory: &str,
        limits: CodeFetchLimits,
    ) -> Result<Vec<CodeSnippet>, DomainError> {
        let repo_info = self.fetch_repo_info(identifier).await?;
        let branch = repo_info
            .default_branch
            .unwrap_or_else(|| "main".to_string());

        let url = format!("{}/repos/{identifier}/git/trees/{branch}", self.api_url);
        let tree: TreeResponse = self
            .get_json(&url, &[("recursive", "1")], "directory tree")
            .await?;

        let paths = select_tree_paths(&tree.tree, directory, limits.max_files);
        if paths.is_empty() {
            return Err(DomainError::not_found(format!(
                "no source files found in {directory}/"
            )));
        }

        let mut snippets = Vec::with_capacity(paths.len());
        for path in paths {
            match self.fetch_file_content(identifier, &path, &branch).await {
                Ok(content) => {
                    let url = self.blob_url(identifier, &branch, &path);
                    snippets.push(CodeSnippet::from_content(
                        path,
                        &content,
                        limits.max_lines_per_file,
                        url,
                    ));
                }
                Err(e) => warn!("Skipping {path}: {e}"),
            }
        }

        if snippets.is_empty() {
            return Err(DomainError::not_found(format!(
                "no source files could be read from {directory}/"
            )));
        }

        info!("Fetched {} code files from {directory}/", snippets.len());
        Ok(snippets)
    }
}

fn classify_status(status: StatusCode, what: &str) -> DomainError {
    match status.as_u16() {
        401 | 403 => DomainError::authentication(format!(
            "GitHub rejected the credential while fetching {what} (HTTP {status})"
        )),
        404 => DomainError::not_found(format!("{what} (HTTP 404)")),
        429 => DomainError::rate_limit(format!(
            "GitHub throttled the request for {what} (HTTP 429)"
        )),
        _ => DomainError::internal(format!("GitHub returned HTTP {status} for {what}")),
    }
}

/// Decode the base64 payload of a contents-API response. GitHub inserts
/// newlines into the encoded text, so whitespace is stripped first.
fn decode_base64_content(encoded: &str) -> Result<String, DomainError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| DomainError::internal(format!("invalid base64 content: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| DomainError::internal(format!("content is not valid UTF-8: {e}")))
}

fn truncate_bytes(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn has_source_extension(path: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Pick the blob paths the code Q&A walk will fetch: recognized source files
/// under `directory` (every path when `directory` is the root), sorted
/// lexicographically for a stable depth-first order, then capped at `max`.
fn select_tree_paths(tree: &[TreeEntry], directory: &str, max: usize) -> Vec<String> {
    let is_root = matches!(directory, "" | "." | "/");
    let prefix = format!("{}/", directory.trim_end_matches('/'));

    let mut paths: Vec<String> = tree
        .iter()
        .filter(|entry| entry.kind == "blob")
        .filter(|entry| has_source_extension(&entry.path))
        .filter(|entry| is_root || entry.path.starts_with(&prefix))
        .map(|entry| entry.path.clone())
        .collect();

    paths.sort();
    paths.truncate(max);
    paths
}

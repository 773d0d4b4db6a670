use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::DocumentSearch;
use crate::domain::{DomainError, SearchResult};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(90);
const FETCH_TIMEOUT: Duration = Duration::from_secs(180);
/// At most this many documents are fetched per search.
const TOP_K: usize = 3;
/// Retrieved document content is cut at this many bytes.
const CONTENT_MAX_BYTES: usize = 2000;

const DRIVE_URI_PREFIX: &str = "gdrive:///";

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<RpcResult>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RpcResult {
    #[serde(default)]
    content: Vec<RpcContent>,
}

#[derive(Deserialize)]
struct RpcContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    name: String,
    uri: String,
}

#[derive(Deserialize)]
struct FilePayload {
    #[serde(default)]
    content: String,
}

/// [`DocumentSearch`] over a JSON-RPC Drive proxy.
///
/// The proxy exposes `search` and `get_file` tools; document identities come
/// back as `gdrive:///<id>` URIs, which are converted to clickable viewer
/// URLs before results leave this connector. Any transport failure maps to
/// `Unavailable`, which the orchestrator treats as non-fatal.
pub struct DriveSearchConnector {
    search_client: reqwest::Client,
    fetch_client: reqwest::Client,
    proxy_url: String,
    access_token: String,
}

impl DriveSearchConnector {
    pub fn new(proxy_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let mut url: String = proxy_url.into();
        if !url.starts_with("http") {
            url = format!("https://{url}");
        }
        Self {
            search_client: reqwest::Client::builder()
                .timeout(SEARCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            fetch_client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            proxy_url: url,
            access_token: access_token.into(),
        }
    }

    async fn call_tool(
        &self,
        client: &reqwest::Client,
        id: u32,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, DomainError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments },
        });

        let response = client
            .post(&self.proxy_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::unavailable(format!("Drive proxy not reachable: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(DomainError::unavailable(format!(
                "Drive proxy returned HTTP {}",
                response.status()
            )));
        }

        let rpc: RpcResponse = response.json().await.map_err(|e| {
            DomainError::unavailable(format!("invalid Drive proxy response: {e}"))
        })?;

        if let Some(error) = rpc.error {
            return Err(DomainError::unavailable(format!(
                "Drive proxy error: {error}"
            )));
        }

        Ok(rpc
            .result
            .and_then(|r| r.content.into_iter().next())
            .map(|c| c.text)
            .unwrap_or_default())
    }

    async fn search_files(&self, query: &str) -> Result<Vec<DriveFile>, DomainError> {
        let text = self
            .call_tool(
                &self.search_client,
                1,
                "search",
                json!({ "query": query, "access_token": self.access_token }),
            )
            .await?;

        if text.is_empty() {
            return Ok(vec![]);
        }
        let payload: SearchPayload = serde_json::from_str(&text).map_err(|e| {
            DomainError::unavailable(format!("unparseable Drive search payload: {e}"))
        })?;
        Ok(payload.files)
    }

    async fn fetch_file(&self, uri: &str) -> Result<String, DomainError> {
        let text = self
            .call_tool(
                &self.fetch_client,
                2,
                "get_file",
                json!({ "uri": uri, "access_token": self.access_token }),
            )
            .await?;

        if text.is_empty() {
            return Ok(String::new());
        }
        let payload: FilePayload = serde_json::from_str(&text).map_err(|e| {
            DomainError::unavailable(format!("unparseable Drive file payload: {e}"))
        })?;
        Ok(payload.content)
    }
}

#[async_trait]
impl DocumentSearch for DriveSearchConnector {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        info!("Searching Drive for: {query}");
        let files = self.search_files(query).await?;
        if files.is_empty() {
            debug!("No Drive documents matched '{query}'");
            return Ok(vec![]);
        }

        let mut results = Vec::new();
        for file in files.into_iter().take(TOP_K) {
            let content = match self.fetch_file(&file.uri).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping Drive document {}: {e}", file.name);
                    continue;
                }
            };
            let snippet = truncate_chars(&content, CONTENT_MAX_BYTES);
            results.push(SearchResult::drive(
                file.name,
                snippet,
                viewer_url(&file.uri),
            ));
        }

        info!("Retrieved {} Drive documents", results.len());
        Ok(results)
    }
}

/// Convert an internal `gdrive:///<id>` URI to the user-facing viewer URL.
/// Anything else passes through unchanged so a surprising proxy response is
/// still clickable rather than dropped.
fn viewer_url(uri: &str) -> String {
    match uri.strip_prefix(DRIVE_URI_PREFIX) {
        Some(id) if !id.is_empty() => format!("https://drive.google.com/file/d/{id}/view"),
        _ => uri.to_string(),
    }
}

fn truncate_chars(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_uri_becomes_viewer_url() {
        assert_eq!(
            viewer_url("gdrive:///abc123"),
            "https://drive.google.com/file/d/abc123/view"
        );
    }

    #[test]
    fn non_drive_uri_passes_through() {
        assert_eq!(viewer_url("https://example.com/doc"), "https://example.com/doc");
        assert_eq!(viewer_url("gdrive:///"), "gdrive:///");
    }

    #[test]
    fn search_payload_parses_proxy_shape() {
        let payload: SearchPayload = serde_json::from_str(
            r#"{"files": [{"name": "Serving Checklist", "uri": "gdrive:///xyz", "mimeType": "application/vnd.google-apps.document"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.files.len(), 1);
        assert_eq!(payload.files[0].name, "Serving Checklist");
    }
}

//! Environment-driven runtime configuration.
//!
//! The optional pipeline stages (Drive search, knowledge-base retrieval) are
//! enabled purely by which variables are present; no flag can turn on a stage
//! whose credentials are missing.

use std::env;

use crate::domain::DomainError;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_GITHUB_WEB_URL: &str = "https://github.com";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub token: Option<String>,
    pub api_url: String,
    pub web_url: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Model used for the final document synthesis; falls back to `model`.
    pub writer_model: String,
}

#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub mcp_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub embedding_endpoint: String,
    pub embedding_model: String,
    pub index_path: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub github: GithubSettings,
    pub llm: LlmSettings,
    pub drive: Option<DriveSettings>,
    pub rag: Option<RagSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github = GithubSettings {
            token: get("GITHUB_TOKEN"),
            api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            web_url: get("GITHUB_WEB_URL").unwrap_or_else(|| DEFAULT_GITHUB_WEB_URL.to_string()),
        };

        let api_key = get("LLM_API_KEY")
            .ok_or_else(|| DomainError::invalid_input("LLM_API_KEY is not set"))?;
        let model = get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let llm = LlmSettings {
            endpoint: get("LLM_ENDPOINT").unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string()),
            api_key,
            writer_model: get("LLM_WRITER_MODEL").unwrap_or_else(|| model.clone()),
            model,
        };

        let drive = match (get("DRIVE_MCP_URL"), get("GOOGLE_DRIVE_TOKEN")) {
            (Some(mcp_url), Some(token)) => Some(DriveSettings { mcp_url, token }),
            _ => None,
        };

        let rag = match (get("EMBEDDING_ENDPOINT"), get("VECTOR_INDEX_PATH")) {
            (Some(embedding_endpoint), Some(index_path)) => Some(RagSettings {
                embedding_endpoint,
                embedding_model: get("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                index_path,
            }),
            _ => None,
        };

        Ok(Self {
            github,
            llm,
            drive,
            rag,
        })
    }
}

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use repoguide::config::RagSettings;
use repoguide::domain::models::sanitize_filename;
use repoguide::{
    AnswerCodeQuestionUseCase, ChatCompletionsClient, DocumentSearch, DriveSearchConnector,
    FileVectorIndex, GenerateLearningPathUseCase, GithubClient, HttpEmbeddingClient,
    KnowledgeBaseConnector, KnowledgeSearch, RunState, Settings,
};

#[derive(Parser)]
#[command(name = "repoguide")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a learning-path document for a repository.
    Generate {
        /// Repository identifier in owner/repo form.
        repo: String,

        /// Include Drive document search (needs Drive credentials).
        #[arg(long)]
        with_drive: bool,

        /// Include knowledge-base retrieval (needs embedding and index config).
        #[arg(long)]
        with_rag: bool,

        /// Output path; defaults to learning_path_<owner_repo>.md.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Answer a question about a repository's code, with citations.
    Ask {
        /// Repository identifier in owner/repo form.
        repo: String,

        question: String,

        #[arg(short, long, default_value = "src")]
        directory: String,
    },
}

/// Build the knowledge-base connector, or `None` when the index file cannot
/// be loaded. A missing or corrupt index degrades the stage the same way a
/// missing configuration does; it never aborts the run.
fn knowledge_connector(rag: &RagSettings) -> Option<Arc<dyn KnowledgeSearch>> {
    match FileVectorIndex::load(&rag.index_path) {
        Ok(index) => {
            let embedding = Arc::new(HttpEmbeddingClient::new(
                rag.embedding_endpoint.clone(),
                rag.embedding_model.clone(),
            ));
            Some(Arc::new(KnowledgeBaseConnector::new(
                embedding,
                Arc::new(index),
            )))
        }
        Err(e) => {
            warn!(
                "Cannot load vector index from {}: {e}; skipping knowledge base",
                rag.index_path
            );
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::from_env()?;

    let github = Arc::new(GithubClient::new(
        settings.github.token.clone().unwrap_or_default(),
        settings.github.api_url.clone(),
        settings.github.web_url.clone(),
    ));

    match cli.command {
        Commands::Generate {
            repo,
            with_drive,
            with_rag,
            output,
        } => {
            let chat = Arc::new(ChatCompletionsClient::new(
                settings.llm.endpoint.clone(),
                settings.llm.api_key.clone(),
                settings.llm.writer_model.clone(),
            ));

            let mut use_case = GenerateLearningPathUseCase::new(github, chat);

            if with_drive {
                match settings.drive.as_ref() {
                    Some(drive) => {
                        let connector: Arc<dyn DocumentSearch> = Arc::new(
                            DriveSearchConnector::new(drive.mcp_url.clone(), drive.token.clone()),
                        );
                        use_case = use_case.with_document_search(connector);
                    }
                    None => warn!(
                        "--with-drive requested but DRIVE_MCP_URL/GOOGLE_DRIVE_TOKEN are not set; skipping Drive search"
                    ),
                }
            }

            if with_rag {
                match settings.rag.as_ref() {
                    Some(rag) => {
                        if let Some(connector) = knowledge_connector(rag) {
                            use_case = use_case.with_knowledge_search(connector);
                        }
                    }
                    None => warn!(
                        "--with-rag requested but EMBEDDING_ENDPOINT/VECTOR_INDEX_PATH are not set; skipping knowledge base"
                    ),
                }
            }

            let run = use_case.execute(&repo).await;
            if run.state() == RunState::Failed {
                let message = run
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "pipeline failed".to_string());
                anyhow::bail!("Failed to generate learning path for {repo}: {message}");
            }

            let markdown = run.into_result()?;
            let path = output
                .unwrap_or_else(|| format!("learning_path_{}.md", sanitize_filename(&repo)));
            std::fs::write(&path, &markdown)?;
            info!("Learning path written to {path}");
            println!("{path}");
        }

        Commands::Ask {
            repo,
            question,
            directory,
        } => {
            let chat = Arc::new(ChatCompletionsClient::new(
                settings.llm.endpoint.clone(),
                settings.llm.api_key.clone(),
                settings.llm.model.clone(),
            ));

            let use_case = AnswerCodeQuestionUseCase::new(github, chat);
            let answer = use_case.execute(&repo, &question, &directory).await?;

            println!("{}", answer.answer());

            if !answer.citations().is_empty() {
                println!("\nSources:");
                for citation in answer.citations() {
                    if citation.url.is_empty() {
                        println!("  {}:{}", citation.path, citation.line_locator);
                    } else {
                        println!(
                            "  {}:{} <{}>",
                            citation.path, citation.line_locator, citation.url
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod wiring_tests {
    use super::*;
    use std::io::Write;

    fn rag_settings(index_path: &str) -> RagSettings {
        RagSettings {
            embedding_endpoint: "https://emb.internal/v1/embeddings".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            index_path: index_path.to_string(),
        }
    }

    #[test]
    fn broken_index_file_skips_the_knowledge_stage() {
        assert!(knowledge_connector(&rag_settings("/nonexistent/index.json")).is_none());
    }

    #[test]
    fn corrupt_index_file_skips_the_knowledge_stage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(knowledge_connector(&rag_settings(file.path().to_str().unwrap())).is_none());
    }

    #[test]
    fn valid_index_file_yields_a_connector() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"collection": "demo", "text": "notes", "vector": [1.0]}]"#)
            .unwrap();
        assert!(knowledge_connector(&rag_settings(file.path().to_str().unwrap())).is_some());
    }
}

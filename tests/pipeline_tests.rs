use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use repoguide::domain::models::EntryKind;
use repoguide::{
    AnswerCodeQuestionUseCase, ChatClient, CodeFetchLimits, CodeReader, CodeSnippet,
    CommitSummary, DocumentSearch, DomainError, FileEntry, GenerateLearningPathUseCase,
    KnowledgeSearch, RepositoryData, RepositoryDescriptor, RunState, SearchResult,
    SourceConnector,
};

fn demo_data() -> RepositoryData {
    let descriptor = RepositoryDescriptor::new(
        "octo/demo".to_string(),
        "demo".to_string(),
        Some("A demo project".to_string()),
        "main".to_string(),
        "public".to_string(),
        Some("MIT".to_string()),
        Some("Python".to_string()),
        vec![],
        3,
        0,
        1,
        "https://github.com/octo/demo".to_string(),
        Some("2025-02-01T12:00:00Z".to_string()),
    );
    RepositoryData {
        descriptor,
        files: vec![
            FileEntry::new(
                "main.py".to_string(),
                "main.py".to_string(),
                EntryKind::File,
                120,
                "https://github.com/octo/demo/blob/main/main.py".to_string(),
            ),
            FileEntry::new(
                "src".to_string(),
                "src".to_string(),
                EntryKind::Directory,
                0,
                "https://github.com/octo/demo/tree/main/src".to_string(),
            ),
        ],
        commits: vec![
            CommitSummary::new(
                "abc1234000".to_string(),
                "Initial commit",
                "Ada".to_string(),
                "2025-01-01T00:00:00Z".to_string(),
                "https://github.com/octo/demo/commit/abc1234".to_string(),
            ),
            CommitSummary::new(
                "def5678000".to_string(),
                "Add parser\n\nlonger body",
                "Grace".to_string(),
                "2025-01-02T00:00:00Z".to_string(),
                "https://github.com/octo/demo/commit/def5678".to_string(),
            ),
        ],
        readme: "# Demo".to_string(),
        snippets: vec![CodeSnippet::from_prefix(
            "main.py".to_string(),
            "print('hi')",
            300,
            "https://github.com/octo/demo/blob/main/main.py".to_string(),
        )],
    }
}

struct StubSource;

#[async_trait]
impl SourceConnector for StubSource {
    async fn fetch_repository_data(
        &self,
        _identifier: &str,
    ) -> Result<RepositoryData, DomainError> {
        Ok(demo_data())
    }
}

struct FailingSource;

#[async_trait]
impl SourceConnector for FailingSource {
    async fn fetch_repository_data(
        &self,
        _identifier: &str,
    ) -> Result<RepositoryData, DomainError> {
        Err(DomainError::authentication("bad credentials"))
    }
}

struct StubChat {
    calls: AtomicUsize,
}

impl StubChat {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatClient for StubChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("A stubbed overview narrative.".to_string())
    }
}

struct FailingChat;

#[async_trait]
impl ChatClient for FailingChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
        Err(DomainError::unavailable("model endpoint down"))
    }
}

struct FailingDrive;

#[async_trait]
impl DocumentSearch for FailingDrive {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, DomainError> {
        Err(DomainError::unavailable("proxy unreachable"))
    }
}

struct StubKnowledge;

#[async_trait]
impl KnowledgeSearch for StubKnowledge {
    async fn search(&self, _identifier: &str) -> Result<Vec<SearchResult>, DomainError> {
        Ok(vec![SearchResult::knowledge_base(
            "demo".to_string(),
            "demo".to_string(),
            "serving checklist for demo".to_string(),
            0.87,
        )])
    }
}

#[tokio::test]
async fn generation_with_source_only_produces_full_document() {
    let chat = Arc::new(StubChat::new());
    let use_case = GenerateLearningPathUseCase::new(Arc::new(StubSource), chat.clone());

    let run = use_case.execute("octo/demo").await;
    assert_eq!(run.state(), RunState::Done);

    let markdown = run.into_result().unwrap();
    for section in [
        "# Learning Path: demo",
        "## Overview",
        "## Recent Contributors",
        "## Repository Structure",
        "## Code Snippets",
        "## Reference Documentation",
        "## Getting Started",
    ] {
        assert!(markdown.contains(section), "missing section: {section}");
    }

    assert!(markdown.contains("A stubbed overview narrative."));
    assert!(markdown.contains("License: MIT"));
    assert!(markdown.contains("**Ada**"));
    assert!(markdown.contains("Add parser"));
    // Disabled optional stages are stated explicitly, never omitted.
    assert!(markdown.contains("No results from this source."));
    // One model call per run.
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn source_failure_terminates_the_run() {
    let use_case =
        GenerateLearningPathUseCase::new(Arc::new(FailingSource), Arc::new(StubChat::new()));

    let run = use_case.execute("octo/demo").await;
    assert_eq!(run.state(), RunState::Failed);
    assert!(run.markdown().is_none());
    assert!(run.error().unwrap().is_authentication());
}

#[tokio::test]
async fn invalid_identifier_fails_before_any_fetch() {
    let use_case =
        GenerateLearningPathUseCase::new(Arc::new(FailingSource), Arc::new(StubChat::new()));

    let run = use_case.execute("not-a-repo-identifier").await;
    assert_eq!(run.state(), RunState::Failed);
    assert!(matches!(
        run.error(),
        Some(DomainError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn optional_stage_failure_degrades_but_completes() {
    let use_case =
        GenerateLearningPathUseCase::new(Arc::new(StubSource), Arc::new(StubChat::new()))
            .with_document_search(Arc::new(FailingDrive));

    let run = use_case.execute("octo/demo").await;
    assert_eq!(run.state(), RunState::Done);

    let markdown = run.into_result().unwrap();
    assert!(markdown.contains("source unavailable"));
}

#[tokio::test]
async fn knowledge_results_appear_in_reference_section() {
    let use_case =
        GenerateLearningPathUseCase::new(Arc::new(StubSource), Arc::new(StubChat::new()))
            .with_knowledge_search(Arc::new(StubKnowledge));

    let run = use_case.execute("octo/demo").await;
    let markdown = run.into_result().unwrap();
    assert!(markdown.contains("[kb/demo]"));
    assert!(markdown.contains("serving checklist for demo"));
}

#[tokio::test]
async fn synthesis_failure_falls_back_to_descriptor_summary() {
    let use_case =
        GenerateLearningPathUseCase::new(Arc::new(StubSource), Arc::new(FailingChat));

    let run = use_case.execute("octo/demo").await;
    assert_eq!(run.state(), RunState::Done);

    let markdown = run.into_result().unwrap();
    assert!(markdown.contains("## Overview"));
    assert!(markdown.contains("octo/demo"));
}

struct StubReader {
    snippets: Vec<(String, String)>,
}

#[async_trait]
impl CodeReader for StubReader {
    async fn fetch_directory_code(
        &self,
        identifier: &str,
        directory: &str,
        _limits: CodeFetchLimits,
    ) -> Result<Vec<CodeSnippet>, DomainError> {
        if self.snippets.is_empty() {
            return Err(DomainError::not_found(format!(
                "no source files under {directory}/ in {identifier}"
            )));
        }
        Ok(self
            .snippets
            .iter()
            .map(|(path, content)| {
                CodeSnippet::from_content(
                    path.clone(),
                    content,
                    1000,
                    format!("https://github.com/{identifier}/blob/main/{path}"),
                )
            })
            .collect())
    }
}

struct CitingChat;

#[async_trait]
impl ChatClient for CitingChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
        Ok("The entry point is main() in src/app.py:2. Setup happens in src/app.py:1-2."
            .to_string())
    }
}

#[tokio::test]
async fn code_question_yields_answer_with_resolved_citations() {
    let reader = StubReader {
        snippets: vec![(
            "src/app.py".to_string(),
            "import os\ndef main():\n    pass\n".to_string(),
        )],
    };
    let use_case = AnswerCodeQuestionUseCase::new(Arc::new(reader), Arc::new(CitingChat));

    let answer = use_case
        .execute("octo/demo", "Where is the entry point?", "src")
        .await
        .unwrap();

    assert!(answer.found_files());
    assert_eq!(answer.files_read(), 1);
    assert!(answer.answer().contains("src/app.py:2"));
    assert!(!answer.citations().is_empty());
    assert!(answer.citations()[0].url.contains("src/app.py"));
}

#[tokio::test]
async fn code_question_with_no_files_reports_it_without_failing() {
    let use_case = AnswerCodeQuestionUseCase::new(
        Arc::new(StubReader { snippets: vec![] }),
        Arc::new(CitingChat),
    );

    let answer = use_case
        .execute("octo/demo", "Where is the entry point?", "lib")
        .await
        .unwrap();

    assert!(!answer.found_files());
    assert!(answer.answer().contains("No files found"));
    assert!(answer.citations().is_empty());
}

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::application::{
    ChatClient, DocumentSearch, KnowledgeSearch, RepositoryData, SourceConnector,
};
use crate::domain::models::validate_identifier;
use crate::domain::{DomainError, PipelineContext, RunState, SearchResult};

const SOURCE_STAGE: &str = "source";
const DRIVE_STAGE: &str = "drive";
const KNOWLEDGE_STAGE: &str = "knowledge_base";

const NO_RESULTS: &str = "no results found";
const NO_SOURCE_RESULTS: &str = "No results from this source.";

/// System prompt for the single synthesis model call. The model writes the
/// free-text overview narrative; all factual sections are assembled from
/// connector results and never fabricated.
const SYNTHESIS_SYSTEM_PROMPT: &str = "\
You are a technical writer creating a learning path for developers joining a \
project. You will receive stage-labeled notes gathered from the project's \
repository and reference sources. Write a short overview narrative (2-4 \
paragraphs) describing what the project does, how it is put together, and \
what a newcomer should look at first. Use ONLY facts present in the notes. \
Do not invent file names, features, or links. Return plain prose, no headings.";

/// Outcome of one learning-path generation run.
///
/// Carries the terminal [`RunState`] alongside the output so callers can
/// distinguish a clean run from a degraded one that still completed.
#[derive(Debug)]
pub struct PipelineRun {
    state: RunState,
    markdown: Option<String>,
    error: Option<DomainError>,
}

impl PipelineRun {
    fn done(markdown: String) -> Self {
        Self {
            state: RunState::Done,
            markdown: Some(markdown),
            error: None,
        }
    }

    fn failed(error: DomainError) -> Self {
        Self {
            state: RunState::Failed,
            markdown: None,
            error: Some(error),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn markdown(&self) -> Option<&str> {
        self.markdown.as_deref()
    }

    pub fn error(&self) -> Option<&DomainError> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> Result<String, DomainError> {
        match (self.markdown, self.error) {
            (Some(markdown), _) => Ok(markdown),
            (None, Some(error)) => Err(error),
            (None, None) => Err(DomainError::internal("run produced no output")),
        }
    }
}

/// Result of running one optional stage: skipped entirely, completed with
/// results, or degraded because the backend was unavailable.
enum OptionalStageOutcome {
    Disabled,
    Results(Vec<SearchResult>),
    Unavailable,
}

/// Orchestrates the fixed stage sequence
/// `Source -> [Drive] -> [KnowledgeBase] -> Synthesize`.
///
/// Each stage before synthesis invokes exactly one connector and appends its
/// labeled textual output to the [`PipelineContext`]; the synthesis stage
/// makes the run's single model call and assembles the fixed Markdown
/// template. Optional-stage failures degrade to an empty result set; only a
/// source-stage failure terminates the run in `Failed`.
pub struct GenerateLearningPathUseCase {
    source: Arc<dyn SourceConnector>,
    drive: Option<Arc<dyn DocumentSearch>>,
    knowledge: Option<Arc<dyn KnowledgeSearch>>,
    chat: Arc<dyn ChatClient>,
}

impl GenerateLearningPathUseCase {
    pub fn new(source: Arc<dyn SourceConnector>, chat: Arc<dyn ChatClient>) -> Self {
        Self {
            source,
            drive: None,
            knowledge: None,
            chat,
        }
    }

    pub fn with_document_search(mut self, drive: Arc<dyn DocumentSearch>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_knowledge_search(mut self, knowledge: Arc<dyn KnowledgeSearch>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub async fn execute(&self, identifier: &str) -> PipelineRun {
        let start_time = Instant::now();
        let mut state = RunState::Init;
        let mut ctx = PipelineContext::new();

        if !validate_identifier(identifier) {
            return PipelineRun::failed(DomainError::invalid_input(format!(
                "invalid repository identifier '{identifier}', expected owner/repo"
            )));
        }

        // --- Source stage (mandatory) ---
        state = advance(state, RunState::FetchSource);
        let data = match self.source.fetch_repository_data(identifier).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Source stage failed for {identifier}: {e}");
                return PipelineRun::failed(e);
            }
        };
        ctx.append(SOURCE_STAGE, format_source_stage(&data));
        info!(
            "Fetched {}: {} files, {} commits, {} snippets",
            identifier,
            data.files.len(),
            data.commits.len(),
            data.snippets.len()
        );

        // --- Document search stage (optional) ---
        let drive_outcome = match &self.drive {
            None => OptionalStageOutcome::Disabled,
            Some(drive) => {
                state = advance(state, RunState::FetchDocs);
                match drive.search(data.descriptor.full_name()).await {
                    Ok(results) => {
                        ctx.append(DRIVE_STAGE, format_results_stage(&results));
                        OptionalStageOutcome::Results(results)
                    }
                    Err(e) => {
                        warn!("Document search degraded to empty results: {e}");
                        ctx.append(DRIVE_STAGE, format!("source unavailable; {NO_RESULTS}"));
                        OptionalStageOutcome::Unavailable
                    }
                }
            }
        };

        // --- Knowledge-base stage (optional) ---
        let kb_outcome = match &self.knowledge {
            None => OptionalStageOutcome::Disabled,
            Some(knowledge) => {
                state = advance(state, RunState::FetchKb);
                match knowledge.search(identifier).await {
                    Ok(results) => {
                        ctx.append(KNOWLEDGE_STAGE, format_results_stage(&results));
                        OptionalStageOutcome::Results(results)
                    }
                    Err(e) => {
                        warn!("Knowledge-base search degraded to empty results: {e}");
                        ctx.append(
                            KNOWLEDGE_STAGE,
                            format!("source unavailable; {NO_RESULTS}"),
                        );
                        OptionalStageOutcome::Unavailable
                    }
                }
            }
        };

        // --- Synthesis stage ---
        state = advance(state, RunState::Synthesize);
        info!("Synthesizing from {} stage outputs", ctx.len());
        let narrative = match self
            .chat
            .complete(SYNTHESIS_SYSTEM_PROMPT, &ctx.combined())
            .await
        {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) | Err(_) => {
                // The state machine reserves Failed for the source stage, so a
                // synthesis-model failure degrades to the descriptor summary.
                warn!("Synthesis model unavailable; falling back to descriptor summary");
                data.descriptor.summary()
            }
        };

        let markdown = render_markdown(&data, &drive_outcome, &kb_outcome, &narrative);
        let _ = advance(state, RunState::Done);

        info!(
            "Generated learning path for {} in {:.2}s",
            identifier,
            start_time.elapsed().as_secs_f64()
        );
        PipelineRun::done(markdown)
    }
}

fn advance(from: RunState, to: RunState) -> RunState {
    debug_assert!(!from.is_terminal(), "cannot leave terminal state {from:?}");
    to
}

/// Deterministic text block the source stage contributes to the context.
fn format_source_stage(data: &RepositoryData) -> String {
    let mut out = String::new();
    let d = &data.descriptor;
    out.push_str(&format!("Repository: {} ({})\n", d.full_name(), d.html_url()));
    if let Some(desc) = d.description() {
        out.push_str(&format!("Description: {desc}\n"));
    }
    out.push_str(&format!(
        "Default branch: {} | Visibility: {} | License: {}\n",
        d.default_branch(),
        d.visibility(),
        d.license().unwrap_or("unknown")
    ));
    out.push_str(&format!(
        "Stars: {} | Forks: {} | Open issues: {}\n",
        d.stargazers_count(),
        d.forks_count(),
        d.open_issues_count()
    ));
    if !d.topics().is_empty() {
        out.push_str(&format!("Topics: {}\n", d.topics().join(", ")));
    }

    if data.files.is_empty() {
        out.push_str(&format!("Files: {NO_RESULTS}\n"));
    } else {
        out.push_str("Files:\n");
        for entry in &data.files {
            out.push_str(&format!("  {} ({})\n", entry.path(), entry.kind().as_str()));
        }
    }

    if data.commits.is_empty() {
        out.push_str(&format!("Recent commits: {NO_RESULTS}\n"));
    } else {
        out.push_str("Recent commits:\n");
        for commit in &data.commits {
            out.push_str(&format!(
                "  {} {} ({}, {})\n",
                commit.sha(),
                commit.title(),
                commit.author_name(),
                commit.author_date()
            ));
        }
    }

    if data.readme.is_empty() {
        out.push_str("README: not found\n");
    } else {
        out.push_str(&format!("README:\n{}\n", data.readme));
    }

    for snippet in &data.snippets {
        out.push_str(&format!(
            "Snippet from {} ({}):\n{}\n",
            snippet.path(),
            snippet.html_url(),
            snippet.text()
        ));
    }
    out
}

/// Deterministic text block an optional search stage contributes. An empty
/// result sequence is rendered as an explicit "no results found" statement,
/// never invented content.
fn format_results_stage(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .map(|r| {
            let mut line = format!("[{}] {}: {}", r.origin().label(), r.title(), r.snippet());
            if let Some(score) = r.score() {
                line.push_str(&format!(" (score {score:.3})"));
            }
            if let Some(url) = r.html_url() {
                line.push_str(&format!(" <{url}>"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the fixed-template Markdown document. Every factual section is
/// populated only from connector results; the model contributes the overview
/// narrative.
fn render_markdown(
    data: &RepositoryData,
    drive: &OptionalStageOutcome,
    knowledge: &OptionalStageOutcome,
    narrative: &str,
) -> String {
    let d = &data.descriptor;
    let mut out = String::new();

    out.push_str(&format!("# Learning Path: {}\n\n", d.name()));

    out.push_str("## Overview\n\n");
    out.push_str(narrative);
    out.push_str("\n\n");
    out.push_str(&format!("- Repository: [{}]({})\n", d.full_name(), d.html_url()));
    if let Some(desc) = d.description() {
        out.push_str(&format!("- Description: {desc}\n"));
    }
    out.push_str(&format!("- Default branch: `{}`\n", d.default_branch()));
    out.push_str(&format!("- Visibility: {}\n", d.visibility()));
    out.push_str(&format!("- License: {}\n", d.license().unwrap_or("unknown")));
    if let Some(language) = d.language() {
        out.push_str(&format!("- Primary language: {language}\n"));
    }
    out.push_str(&format!(
        "- Stars: {} | Forks: {} | Open issues: {}\n",
        d.stargazers_count(),
        d.forks_count(),
        d.open_issues_count()
    ));
    if !d.topics().is_empty() {
        out.push_str(&format!("- Topics: {}\n", d.topics().join(", ")));
    }
    if let Some(pushed) = d.pushed_at() {
        out.push_str(&format!("- Last push: {pushed}\n"));
    }
    out.push('\n');

    out.push_str("## Recent Contributors\n\n");
    if data.commits.is_empty() {
        out.push_str("No recent commits found.\n");
    } else {
        for commit in &data.commits {
            out.push_str(&format!(
                "- {} by **{}**: [{}]({}) {}\n",
                commit.author_date(),
                commit.author_name(),
                commit.sha(),
                commit.html_url(),
                commit.title()
            ));
        }
    }
    out.push('\n');

    out.push_str("## Repository Structure\n\n");
    if data.files.is_empty() {
        out.push_str("No files listed.\n");
    } else {
        for entry in &data.files {
            out.push_str(&format!(
                "- [{}]({}) ({}, {} bytes)\n",
                entry.path(),
                entry.html_url(),
                entry.kind().as_str(),
                entry.size()
            ));
        }
    }
    out.push('\n');

    out.push_str("## Code Snippets\n\n");
    if data.snippets.is_empty() {
        out.push_str("No entry-point files found.\n");
    } else {
        for snippet in &data.snippets {
            out.push_str(&format!(
                "### [{}]({})\n\n```\n{}\n```\n\n",
                snippet.file_name(),
                snippet.html_url(),
                snippet.text()
            ));
        }
    }

    out.push_str("## Reference Documentation\n\n");
    out.push_str(&format!(
        "- Document search: {}\n",
        render_reference_lines(drive)
    ));
    out.push_str(&format!(
        "- Knowledge base: {}\n",
        render_reference_lines(knowledge)
    ));
    out.push('\n');

    out.push_str("## Getting Started\n\n");
    out.push_str(&format!(
        "1. Browse the repository at [{}]({}).\n",
        d.full_name(),
        d.html_url()
    ));
    out.push_str(&format!(
        "2. Clone it: `git clone {}.git` and check out the `{}` branch.\n",
        d.html_url(),
        d.default_branch()
    ));
    if data.readme.is_empty() {
        out.push_str("3. No README was found; start from the entry-point snippets above.\n");
    } else {
        out.push_str("3. Read the README, then revisit the entry-point snippets above.\n");
    }

    out
}

fn render_reference_lines(outcome: &OptionalStageOutcome) -> String {
    match outcome {
        OptionalStageOutcome::Disabled => NO_SOURCE_RESULTS.to_string(),
        OptionalStageOutcome::Unavailable => {
            format!("source unavailable. {NO_SOURCE_RESULTS}")
        }
        OptionalStageOutcome::Results(results) if results.is_empty() => {
            NO_SOURCE_RESULTS.to_string()
        }
        OptionalStageOutcome::Results(results) => {
            let mut out = String::new();
            for r in results {
                out.push_str(&format!("\n  - [{}] {}", r.origin().label(), r.title()));
                if let Some(score) = r.score() {
                    out.push_str(&format!(" (score {score:.3})"));
                }
                if let Some(url) = r.html_url() {
                    out.push_str(&format!(" [view]({url})"));
                }
                out.push_str(&format!(": {}", r.snippet()));
            }
            out
        }
    }
}

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::application::{ChatClient, CodeFetchLimits, CodeReader};
use crate::domain::{CodeSnippet, DomainError};

/// System prompt for the single Q&A model call. Every claim must carry a
/// `path:line` citation so the answer can be checked against the sources.
const QA_SYSTEM_PROMPT: &str = "\
You are a code analyst answering a question about a repository. You will \
receive the question followed by source files with line-numbered content. \
Answer using ONLY the provided files. Every claim in your answer MUST cite \
its source as `path:line` or `path:start-end` (for example `src/app.py:42`). \
If the files do not contain the answer, say so. Do not invent files or lines.";

/// A resolved source reference extracted from the model's answer.
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub path: String,
    pub line_locator: String,
    pub url: String,
}

/// Answer to a code question plus the citations found in it.
#[derive(Debug)]
pub struct CodeAnswer {
    answer: String,
    citations: Vec<Citation>,
    files_read: usize,
}

impl CodeAnswer {
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn files_read(&self) -> usize {
        self.files_read
    }

    pub fn found_files(&self) -> bool {
        self.files_read > 0
    }
}

/// Single-shot code Q&A flow: fetch bounded directory code, make one model
/// call, extract citations. Independent of the learning-path pipeline.
pub struct AnswerCodeQuestionUseCase {
    reader: Arc<dyn CodeReader>,
    chat: Arc<dyn ChatClient>,
    limits: CodeFetchLimits,
}

impl AnswerCodeQuestionUseCase {
    pub fn new(reader: Arc<dyn CodeReader>, chat: Arc<dyn ChatClient>) -> Self {
        Self {
            reader,
            chat,
            limits: CodeFetchLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CodeFetchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn execute(
        &self,
        identifier: &str,
        question: &str,
        directory: &str,
    ) -> Result<CodeAnswer, DomainError> {
        info!("Answering question about {identifier} ({directory}/): {question}");

        let snippets = match self
            .reader
            .fetch_directory_code(identifier, directory, self.limits)
            .await
        {
            Ok(snippets) => snippets,
            // An empty directory is a user-visible condition, not a crash.
            Err(e) if e.is_not_found() => {
                warn!("No files found under {directory}/: {e}");
                return Ok(CodeAnswer {
                    answer: format!(
                        "No files found in `{directory}/`. Try a different directory or \
                         check that it exists in the repository."
                    ),
                    citations: vec![],
                    files_read: 0,
                });
            }
            Err(e) => return Err(e),
        };

        let prompt = build_question_prompt(question, &snippets);
        let answer = self.chat.complete(QA_SYSTEM_PROMPT, &prompt).await?;
        let citations = extract_citations(&answer, &snippets);

        if citations.is_empty() {
            warn!("Model answer contains no path:line citations");
        }

        Ok(CodeAnswer {
            answer,
            citations,
            files_read: snippets.len(),
        })
    }
}

/// Build the user prompt: the question followed by each file with
/// line-numbered content, so `path:line` citations are checkable.
fn build_question_prompt(question: &str, snippets: &[CodeSnippet]) -> String {
    let mut out = format!("Question: {question}\n\n");
    for snippet in snippets {
        out.push_str(&format!("File: {} ({})\n", snippet.path(), snippet.html_url()));
        for (i, line) in snippet.text().lines().enumerate() {
            out.push_str(&format!("{:>5} | {}\n", i + 1, line));
        }
        out.push('\n');
    }
    out
}

/// Scan the answer for `path:locator` references to any of the fetched
/// files, where the locator is a line number or `start-end` range. Each
/// citation is resolved to the file's browsable URL.
fn extract_citations(answer: &str, snippets: &[CodeSnippet]) -> Vec<Citation> {
    let mut citations = Vec::new();
    for snippet in snippets {
        let needle = format!("{}:", snippet.path());
        let mut search_from = 0;
        while let Some(pos) = answer[search_from..].find(&needle) {
            let locator_start = search_from + pos + needle.len();
            let locator: String = answer[locator_start..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            search_from = locator_start;

            let locator = locator.trim_end_matches('-').to_string();
            if locator.is_empty() {
                continue;
            }
            let duplicate = citations
                .iter()
                .any(|c: &Citation| c.path == snippet.path() && c.line_locator == locator);
            if !duplicate {
                citations.push(Citation {
                    path: snippet.path().to_string(),
                    line_locator: locator,
                    url: snippet.html_url().to_string(),
                });
            }
        }
    }
    citations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(path: &str) -> CodeSnippet {
        CodeSnippet::from_content(
            path.to_string(),
            "fn main() {}\n",
            1000,
            format!("https://github.com/octo/demo/blob/main/{path}"),
        )
    }

    #[test]
    fn extracts_single_line_citation() {
        let snippets = vec![snippet("src/app.py")];
        let citations = extract_citations("The handler lives at src/app.py:42.", &snippets);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].path, "src/app.py");
        assert_eq!(citations[0].line_locator, "42");
        assert!(citations[0].url.contains("src/app.py"));
    }

    #[test]
    fn extracts_range_citation() {
        let snippets = vec![snippet("src/app.py")];
        let citations = extract_citations("See src/app.py:10-25 for the loop.", &snippets);
        assert_eq!(citations[0].line_locator, "10-25");
    }

    #[test]
    fn deduplicates_repeated_citations() {
        let snippets = vec![snippet("src/app.py")];
        let citations =
            extract_citations("src/app.py:7 does X; again src/app.py:7 does X.", &snippets);
        assert_eq!(citations.len(), 1);
    }

    #[test]
    fn ignores_unknown_paths_and_bare_mentions() {
        let snippets = vec![snippet("src/app.py")];
        let citations = extract_citations("other/file.py:3 and src/app.py with no line", &snippets);
        assert!(citations.is_empty());
    }

    #[test]
    fn prompt_numbers_lines() {
        let prompt = build_question_prompt("what?", &[snippet("src/app.py")]);
        assert!(prompt.contains("Question: what?"));
        assert!(prompt.contains("    1 | fn main() {}"));
    }
}

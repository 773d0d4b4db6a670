use serde::{Deserialize, Serialize};

/// Pipeline state for one generation run.
///
/// `Failed` is reachable from `FetchSource` only: a failure in an optional
/// stage degrades to "proceed without that source". `Done` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    FetchSource,
    FetchDocs,
    FetchKb,
    Synthesize,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::FetchSource => "fetch_source",
            RunState::FetchDocs => "fetch_docs",
            RunState::FetchKb => "fetch_kb",
            RunState::Synthesize => "synthesize",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

/// Append-only accumulation of stage outputs within one run.
///
/// Owned exclusively by the orchestrator; each completed stage appends its
/// labeled textual output, later stages and the synthesizer read the whole
/// accumulation. Destroyed when the run produces its final output.
#[derive(Debug, Default)]
pub struct PipelineContext {
    entries: Vec<(String, String)>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stage: impl Into<String>, output: impl Into<String>) {
        self.entries.push((stage.into(), output.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render all stage outputs as one labeled text block, in completion
    /// order, for consumption by the synthesis model call.
    pub fn combined(&self) -> String {
        self.entries
            .iter()
            .map(|(name, output)| format!("### {name}\n{output}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

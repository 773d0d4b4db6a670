pub mod application;
pub mod config;
pub mod connector;
pub mod domain;

pub use application::{
    AnswerCodeQuestionUseCase, ChatClient, Citation, CodeAnswer, CodeFetchLimits, CodeReader,
    DocumentSearch, EmbeddingClient, GenerateLearningPathUseCase, IndexHit, KnowledgeSearch,
    PipelineRun, RepositoryData, SourceConnector, VectorIndex,
};

pub use config::Settings;

pub use connector::{
    ChatCompletionsClient, DriveSearchConnector, FileVectorIndex, GithubClient,
    HttpEmbeddingClient, KnowledgeBaseConnector,
};

pub use domain::{
    CodeSnippet, CommitSummary, DomainError, FileEntry, PipelineContext, RepositoryDescriptor,
    ResultOrigin, RunState, SearchResult,
};

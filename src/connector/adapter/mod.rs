mod chat_completions_client;
mod drive_search;
mod file_vector_index;
mod github_client;
mod http_embedding;
mod knowledge_base;

pub mod keywords;

pub use chat_completions_client::*;
pub use drive_search::*;
pub use file_vector_index::*;
pub use github_client::*;
pub use http_embedding::*;
pub use knowledge_base::*;

mod chat_client;
mod code_reader;
mod document_search;
mod embedding_client;
mod knowledge_search;
mod source_connector;
mod vector_index;

pub use chat_client::*;
pub use code_reader::*;
pub use document_search::*;
pub use embedding_client::*;
pub use knowledge_search::*;
pub use source_connector::*;
pub use vector_index::*;

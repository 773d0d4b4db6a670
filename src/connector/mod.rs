//! # Connector Layer
//!
//! External integrations implementing the application interfaces:
//! - GitHub REST client (repository data and code reading)
//! - Drive document search over a JSON-RPC proxy
//! - Embedding client and file-backed vector index for knowledge bases
//! - Chat completions client for synthesis

pub mod adapter;

pub use adapter::*;

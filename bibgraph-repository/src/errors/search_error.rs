//! Search index error types.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Search query execution failed.
    #[error("Query error: {0}")]
    Query(String),

    /// Failed to index a document.
    #[error("Index error: {0}")]
    Index(String),

    /// Failed to create the search index. Ingestion cannot proceed
    /// without a searchable dedup target, so callers treat this as fatal.
    #[error("Index creation error: {0}")]
    IndexCreation(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::Index(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreation(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

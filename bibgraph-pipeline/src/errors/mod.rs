//! Error types for the ingestion pipeline.

use bibgraph_repository::{RepositoryError, SearchError};
use thiserror::Error;

/// Errors that can occur in the ingestion pipeline.
///
/// Only `IndexBootstrap` is fatal to a run; per-subject repository and
/// search failures are contained by the orchestrator and recorded in the
/// run report instead of propagating.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The search index could not be created or verified. No ingestion
    /// can proceed without a searchable dedup target.
    #[error("Index bootstrap error: {0}")]
    IndexBootstrap(String),

    /// Error from the object repository.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Error from the search index.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Error from a resolution cache backend.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Reserved for stricter dedup policies that refuse to pick among
    /// multiple equally good matches. Not raised by default.
    #[error("Ambiguous resolution: {0}")]
    ResolutionAmbiguous(String),

    /// Ingestion was cancelled before it could start.
    #[error("Ingest cancelled")]
    Cancelled,
}

impl IngestError {
    /// Create an index bootstrap error.
    pub fn bootstrap(msg: impl Into<String>) -> Self {
        Self::IndexBootstrap(msg.into())
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }
}

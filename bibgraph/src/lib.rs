//! # Bibgraph
//!
//! Main library for the bibliographic graph ingester.
//!
//! This crate provides the entry point and configuration for running
//! the graph ingestion pipeline against an object repository and a
//! search index.

pub mod config;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during ingester initialization or execution.
#[derive(Error, Debug)]
pub enum IngesterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] bibgraph_pipeline::IngestError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] bibgraph_repository::SearchError),

    /// Repository error.
    #[error("Repository error: {0}")]
    RepositoryError(#[from] bibgraph_repository::RepositoryError),

    /// Input graph could not be parsed.
    #[error("Input error: {0}")]
    InputError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IngesterError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

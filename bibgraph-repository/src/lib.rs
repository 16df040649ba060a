//! # Bibgraph Repository
//!
//! This crate provides traits and implementations for the two external
//! stores the ingestion pipeline talks to: the HTTP object repository
//! that persists entities, and the search index that backs deduplication
//! and discovery. It includes definitions for errors, interfaces, and
//! concrete implementations for a Fedora-style REST repository and
//! OpenSearch.

pub mod errors;
pub mod http;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use errors::{RepositoryError, SearchError};
pub use http::HttpRepository;
pub use interfaces::{ObjectRepository, SearchIndex};
pub use opensearch::OpenSearchIndex;
pub use types::SearchHit;

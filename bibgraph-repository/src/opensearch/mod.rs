//! OpenSearch search index implementation.

mod client;
pub mod index_config;
pub mod queries;

pub use client::OpenSearchIndex;

//! Search index trait definition.
//!
//! This module defines the abstract interface for the search index that
//! backs deduplication and discovery, allowing for different backend
//! implementations (OpenSearch, Elasticsearch, mock, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::SearchHit;
use bibgraph_shared::SearchDocument;

/// Abstract interface for search index operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async
/// tasks.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Ensure the search index exists with its predefined schema.
    ///
    /// Idempotent: creating an index that already exists is a no-op.
    /// Callers treat a failure here as fatal for the whole run.
    async fn ensure_index(&self) -> Result<(), SearchError>;

    /// Find documents whose `field` matches `value` exactly.
    ///
    /// Hits are returned in ascending document id order so that repeated
    /// lookups select the same hit regardless of relevance scoring.
    async fn find_exact(&self, field: &str, value: &str) -> Result<Vec<SearchHit>, SearchError>;

    /// Index-or-replace a document by its document id.
    async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchError>;
}

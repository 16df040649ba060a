//! Entity resolution.
//!
//! A `Resolver` maps a subject's identifying literals to a previously
//! established canonical location, or none. `IndexResolver` queries the
//! search index; `CachedResolver` consults a local key-value cache keyed
//! by content digest and can wrap another resolver, so record-conversion
//! pipelines can compose or substitute the two.

mod cache;

pub use cache::{identity_digest, CachedResolver, MemoryCache, ResolutionCache};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::IngestError;
use bibgraph_repository::SearchIndex;
use bibgraph_shared::{Candidate, Location};

/// Resolves identifying candidates to a canonical location.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Try each candidate in priority order; return the first established
    /// location, or `None` when no candidate is known.
    async fn resolve(&self, candidates: &[Candidate]) -> Result<Option<Location>, IngestError>;
}

/// Resolver backed by the search index: one exact-match query per
/// candidate, first hit wins.
pub struct IndexResolver {
    index: Arc<dyn SearchIndex>,
}

impl IndexResolver {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Resolver for IndexResolver {
    async fn resolve(&self, candidates: &[Candidate]) -> Result<Option<Location>, IngestError> {
        for candidate in candidates {
            if candidate.value.trim().is_empty() {
                continue;
            }
            let hits = self
                .index
                .find_exact(&candidate.field, &candidate.value)
                .await?;
            if hits.len() > 1 {
                // Hits come back in ascending document id order, so this
                // stays deterministic; the extra matches are only noted.
                debug!(
                    field = %candidate.field,
                    value = %candidate.value,
                    hits = hits.len(),
                    "Multiple index matches for identifying value"
                );
            }
            if let Some(hit) = hits.first() {
                match &hit.location {
                    Some(location) => {
                        debug!(
                            field = %candidate.field,
                            value = %candidate.value,
                            location = %location,
                            "Resolved subject against index"
                        );
                        return Ok(Some(location.clone()));
                    }
                    None => {
                        warn!(
                            doc_id = %hit.id,
                            field = %candidate.field,
                            "Index hit carries no stored location; skipping"
                        );
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibgraph_repository::{SearchError, SearchHit};
    use bibgraph_shared::SearchDocument;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock search index serving canned hits for one (field, value) pair.
    struct MockSearchIndex {
        field: String,
        value: String,
        hits: Vec<(String, serde_json::Value)>,
        queries: AtomicUsize,
    }

    impl MockSearchIndex {
        fn new(field: &str, value: &str, hits: Vec<(String, serde_json::Value)>) -> Self {
            Self {
                field: field.to_string(),
                value: value.to_string(),
                hits,
                queries: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self::new("", "", Vec::new())
        }
    }

    #[async_trait]
    impl SearchIndex for MockSearchIndex {
        async fn ensure_index(&self) -> Result<(), SearchError> {
            Ok(())
        }

        async fn find_exact(
            &self,
            field: &str,
            value: &str,
        ) -> Result<Vec<SearchHit>, SearchError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if field == self.field && value == self.value {
                Ok(self
                    .hits
                    .iter()
                    .map(|(id, source)| SearchHit::from_source(id.clone(), source.clone()))
                    .collect())
            } else {
                Ok(Vec::new())
            }
        }

        async fn upsert(&self, _document: &SearchDocument) -> Result<(), SearchError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    fn candidate(field: &str, value: &str) -> Candidate {
        Candidate {
            field: field.to_string(),
            value: value.to_string(),
            class: None,
        }
    }

    #[tokio::test]
    async fn test_first_matching_candidate_wins() {
        let index = Arc::new(MockSearchIndex::new(
            "bf:label",
            "Moby Dick",
            vec![(
                "doc-1".to_string(),
                json!({"fcrepo:hasLocation": ["http://repo.example.org/rest/1"]}),
            )],
        ));
        let resolver = IndexResolver::new(index.clone());

        let location = resolver
            .resolve(&[
                candidate("bf:authorizedAccessPoint", "Melville. Moby Dick"),
                candidate("bf:label", "Moby Dick"),
                candidate("bf:titleValue", "Moby Dick"),
            ])
            .await
            .unwrap();

        assert_eq!(
            location.map(|l| l.as_str().to_string()).as_deref(),
            Some("http://repo.example.org/rest/1")
        );
        // resolution stops at the first hit
        assert_eq!(index.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_candidates_are_never_queried() {
        let index = Arc::new(MockSearchIndex::empty());
        let resolver = IndexResolver::new(index.clone());

        let location = resolver
            .resolve(&[candidate("bf:label", "  "), candidate("bf:label", "")])
            .await
            .unwrap();

        assert!(location.is_none());
        assert_eq!(index.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let resolver = IndexResolver::new(Arc::new(MockSearchIndex::empty()));
        let location = resolver
            .resolve(&[candidate("bf:label", "Unknown")])
            .await
            .unwrap();
        assert!(location.is_none());
    }

    #[tokio::test]
    async fn test_first_hit_in_id_order_is_selected() {
        let index = Arc::new(MockSearchIndex::new(
            "bf:label",
            "Moby Dick",
            vec![
                (
                    "doc-1".to_string(),
                    json!({"fcrepo:hasLocation": ["http://repo.example.org/rest/1"]}),
                ),
                (
                    "doc-2".to_string(),
                    json!({"fcrepo:hasLocation": ["http://repo.example.org/rest/2"]}),
                ),
            ],
        ));
        let resolver = IndexResolver::new(index);

        let location = resolver
            .resolve(&[candidate("bf:label", "Moby Dick")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.as_str(), "http://repo.example.org/rest/1");
    }
}

//! Cache-backed resolution.
//!
//! Record-conversion pipelines feed the same orchestrator but resolve
//! against a local key-value cache keyed by a digest over the normalized
//! identifying literal and class. On a hit the incoming subject is
//! rewritten to the cached canonical identity before the graph reaches
//! the orchestrator; misses flow through normally and are written back
//! after materialization.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::IngestError;
use crate::resolver::Resolver;
use bibgraph_shared::profile::normalize_identifier;
use bibgraph_shared::{Candidate, Graph, Location, Term, VocabProfile};

/// Digest over a normalized identifying literal and its class IRI. Stable
/// across runs, so it can key a persistent cache.
pub fn identity_digest(value: &str, class: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_identifier(value).as_bytes());
    hasher.update(b"\n");
    if let Some(class) = class {
        hasher.update(class.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Key-value store mapping identity digests to canonical identities.
#[async_trait]
pub trait ResolutionCache: Send + Sync {
    async fn get(&self, digest: &str) -> Result<Option<String>, IngestError>;
    async fn put(&self, digest: &str, identity: &str) -> Result<(), IngestError>;
}

/// In-memory resolution cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResolutionCache for MemoryCache {
    async fn get(&self, digest: &str) -> Result<Option<String>, IngestError> {
        Ok(self.entries.read().await.get(digest).cloned())
    }

    async fn put(&self, digest: &str, identity: &str) -> Result<(), IngestError> {
        self.entries
            .write()
            .await
            .insert(digest.to_string(), identity.to_string());
        Ok(())
    }
}

/// Resolver backed by a local cache, optionally falling back to another
/// resolver (typically `IndexResolver`). Fallback hits are written back
/// to the cache for future runs.
pub struct CachedResolver {
    cache: Arc<dyn ResolutionCache>,
    fallback: Option<Arc<dyn Resolver>>,
}

impl CachedResolver {
    pub fn new(cache: Arc<dyn ResolutionCache>) -> Self {
        Self {
            cache,
            fallback: None,
        }
    }

    pub fn with_fallback(cache: Arc<dyn ResolutionCache>, fallback: Arc<dyn Resolver>) -> Self {
        Self {
            cache,
            fallback: Some(fallback),
        }
    }

    /// Rewrite cache-known subjects to their canonical identities, so the
    /// orchestrator's phase 1 sees identities it can resolve naturally.
    /// Returns the number of subjects rewritten.
    pub async fn rewrite(
        &self,
        graph: &mut Graph,
        profile: &VocabProfile,
    ) -> Result<usize, IngestError> {
        let mut rewritten = 0;
        for subject in graph.subjects() {
            let candidates = profile.candidates(graph, &subject);
            let Some(first) = candidates.first() else {
                continue;
            };
            let digest = identity_digest(&first.value, first.class.as_deref());
            if let Some(identity) = self.cache.get(&digest).await? {
                if subject.lexical() != identity {
                    debug!(
                        subject = %subject.lexical(),
                        identity = %identity,
                        "Rewriting subject to cached canonical identity"
                    );
                    graph.rewrite_term(&subject, &Term::iri(identity));
                    rewritten += 1;
                }
            }
        }
        Ok(rewritten)
    }

    /// Store digest-to-identity mappings for subjects the run
    /// materialized, so future runs short-circuit before phase 1.
    /// Returns the number of entries written.
    pub async fn record(
        &self,
        graph: &Graph,
        profile: &VocabProfile,
        mapping: &HashMap<Term, Location>,
    ) -> Result<usize, IngestError> {
        let mut recorded = 0;
        for subject in graph.subjects() {
            let Some(location) = mapping.get(&subject) else {
                continue;
            };
            let candidates = profile.candidates(graph, &subject);
            let Some(first) = candidates.first() else {
                continue;
            };
            let digest = identity_digest(&first.value, first.class.as_deref());
            self.cache.put(&digest, location.as_str()).await?;
            recorded += 1;
        }
        Ok(recorded)
    }
}

#[async_trait]
impl Resolver for CachedResolver {
    async fn resolve(&self, candidates: &[Candidate]) -> Result<Option<Location>, IngestError> {
        for candidate in candidates {
            if candidate.value.trim().is_empty() {
                continue;
            }
            let digest = identity_digest(&candidate.value, candidate.class.as_deref());
            if let Some(identity) = self.cache.get(&digest).await? {
                return Ok(Some(Location::new(identity)));
            }
        }

        if let Some(fallback) = &self.fallback {
            if let Some(location) = fallback.resolve(candidates).await? {
                if let Some(first) = candidates.iter().find(|c| !c.value.trim().is_empty()) {
                    let digest = identity_digest(&first.value, first.class.as_deref());
                    self.cache.put(&digest, location.as_str()).await?;
                }
                return Ok(Some(location));
            }
        }

        Ok(None)
    }
}

//! Dependency initialization and wiring for the ingester.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::IngesterError;
use bibgraph_pipeline::{GraphIndexer, IndexResolver, IngestOrchestrator, OrchestratorConfig};
use bibgraph_repository::{HttpRepository, OpenSearchIndex, SearchIndex};
use bibgraph_shared::VocabProfile;

/// Default object repository URL.
const DEFAULT_REPOSITORY_URL: &str = "http://localhost:8080/rest";

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default repository request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Arc<IngestOrchestrator>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REPOSITORY_URL`: object repository URL (default: http://localhost:8080/rest)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `SEARCH_INDEX`: search index name (default: bibframe)
    /// - `INGEST_CONCURRENCY`: subjects processed concurrently (default: 4)
    /// - `INGEST_PROVENANCE`: assert owl:sameAs provenance in patches (default: false)
    /// - `REQUEST_TIMEOUT_MS`: repository request timeout (default: 30000)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IngesterError)` - If initialization fails
    pub async fn new() -> Result<Self, IngesterError> {
        let repository_url =
            env::var("REPOSITORY_URL").unwrap_or_else(|_| DEFAULT_REPOSITORY_URL.to_string());
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());

        let mut profile = VocabProfile::default();
        if let Ok(index_name) = env::var("SEARCH_INDEX") {
            profile.index_name = index_name;
        }

        let config = OrchestratorConfig {
            concurrency: read_env("INGEST_CONCURRENCY", 4)?,
            provenance: read_env("INGEST_PROVENANCE", false)?,
        };
        let timeout_ms: u64 = read_env("REQUEST_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;

        info!(
            repository_url = %repository_url,
            opensearch_url = %opensearch_url,
            index = %profile.index_name,
            concurrency = config.concurrency,
            "Initializing dependencies"
        );

        let profile = Arc::new(profile);
        let repository = Arc::new(HttpRepository::new(
            &repository_url,
            Duration::from_millis(timeout_ms),
        )?);

        let search_index = OpenSearchIndex::new(&opensearch_url, &profile)
            .map_err(|e| IngesterError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        // Verify OpenSearch is reachable
        let healthy = search_index
            .health_check()
            .await
            .map_err(|e| IngesterError::config(format!("OpenSearch health check failed: {}", e)))?;
        if !healthy {
            return Err(IngesterError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let search_index = Arc::new(search_index);
        let resolver = Arc::new(IndexResolver::new(search_index.clone()));
        let indexer = Arc::new(GraphIndexer::new(
            repository.clone(),
            search_index,
            profile.clone(),
        ));

        let orchestrator = Arc::new(IngestOrchestrator::new(
            repository, resolver, indexer, profile, config,
        ));

        Ok(Self { orchestrator })
    }
}

/// Read an optional environment variable, parsing it into the target
/// type and falling back to a default when unset.
fn read_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, IngesterError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| IngesterError::config(format!("Invalid value for {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

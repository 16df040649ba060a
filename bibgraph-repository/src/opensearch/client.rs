//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndex`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchIndex;
use crate::opensearch::{index_config, queries};
use crate::types::SearchHit;
use bibgraph_shared::{SearchDocument, VocabProfile};

/// Maximum hits fetched per exact-match lookup. Dedup only needs the
/// first hit; the rest are fetched for logging ambiguity.
const EXACT_QUERY_LIMIT: usize = 10;

/// Search index backed by OpenSearch.
pub struct OpenSearchIndex {
    client: OpenSearch,
    index_name: String,
    settings: Value,
    bootstrapped: OnceCell<()>,
}

impl OpenSearchIndex {
    /// Create a new client connected to the specified URL, configured for
    /// the profile's index name and mapping.
    pub fn new(url: &str, profile: &VocabProfile) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, index = %profile.index_name, "Created search index client");

        Ok(Self {
            client,
            index_name: profile.index_name.clone(),
            settings: index_config::index_settings(profile),
            bootstrapped: OnceCell::new(),
        })
    }

    /// Parse the hits array out of a search response body.
    fn parse_hits(body: &Value) -> Vec<SearchHit> {
        body.get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let id = hit.get("_id")?.as_str()?;
                        let source = hit.get("_source").cloned().unwrap_or(Value::Null);
                        Some(SearchHit::from_source(id, source))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn bootstrap_index(&self) -> Result<(), SearchError> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[&self.index_name]))
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %self.index_name, "Search index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(self.settings.clone())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(index = %self.index_name, status = %status, body = %body, "Index creation failed");
            return Err(SearchError::index_creation(format!(
                "creating {} failed with status {}: {}",
                self.index_name, status, body
            )));
        }

        info!(index = %self.index_name, "Created search index");
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for OpenSearchIndex {
    /// Create the index with its predefined mapping when absent. The
    /// check runs once per client; later calls are free.
    async fn ensure_index(&self) -> Result<(), SearchError> {
        self.bootstrapped
            .get_or_try_init(|| self.bootstrap_index())
            .await
            .map(|_| ())
    }

    async fn find_exact(&self, field: &str, value: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[&self.index_name]))
            .body(queries::build_exact_query(field, value, EXACT_QUERY_LIMIT))
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::query(format!(
                "exact query on {} failed with status {}: {}",
                field, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(Self::parse_hits(&body))
    }

    async fn upsert(&self, document: &SearchDocument) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_name, &document.id))
            .body(document.to_index_body())
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(doc_id = %document.id, status = %status, body = %body, "Upsert failed");
            return Err(SearchError::index(format!(
                "upsert of {} failed with status {}: {}",
                document.id, status, body
            )));
        }

        debug!(doc_id = %document.id, kind = %document.kind, "Upserted search document");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        match self
            .client
            .cluster()
            .health(opensearch::cluster::ClusterHealthParts::None)
            .send()
            .await
        {
            Ok(response) => {
                let health: Value = response.json().await.unwrap_or(Value::Null);
                let status = health
                    .get("status")
                    .and_then(|s| s.as_str())
                    .unwrap_or("unknown");
                Ok(status == "green" || status == "yellow")
            }
            Err(e) => Err(SearchError::connection(e.to_string())),
        }
    }
}

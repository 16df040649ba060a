//! Graph indexer.
//!
//! Flattens a repository object into a search document and upserts it:
//! metadata allow-list fields, an inferred document kind, and every
//! remaining property outside the excluded namespaces, with all values
//! expanded to arrays and reference values rewritten to known document
//! ids.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::IngestError;
use bibgraph_shared::profile::ns;
use bibgraph_shared::{Location, RepositoryObject, SearchDocument, Term, VocabProfile};
use bibgraph_repository::{ObjectRepository, SearchIndex};

/// Flattens repository objects into the search index.
pub struct GraphIndexer {
    repository: Arc<dyn ObjectRepository>,
    index: Arc<dyn SearchIndex>,
    profile: Arc<VocabProfile>,
}

impl GraphIndexer {
    pub fn new(
        repository: Arc<dyn ObjectRepository>,
        index: Arc<dyn SearchIndex>,
        profile: Arc<VocabProfile>,
    ) -> Self {
        Self {
            repository,
            index,
            profile,
        }
    }

    /// Ensure the search index exists. Failure here blocks the whole run.
    pub async fn ensure_index(&self) -> Result<(), IngestError> {
        self.index
            .ensure_index()
            .await
            .map_err(|e| IngestError::bootstrap(e.to_string()))
    }

    /// Fetch the object at `location`, flatten it, and upsert its search
    /// document. Returns the document id (the repository identifier).
    ///
    /// `ids` maps locations to document ids established earlier in the
    /// run; reference values pointing at a known location are indexed as
    /// that document's id.
    #[instrument(skip(self, ids), fields(location = %location))]
    pub async fn index(
        &self,
        location: &Location,
        ids: &HashMap<String, String>,
    ) -> Result<String, IngestError> {
        let object = self.repository.fetch(location).await?;
        let document = self.build_document(&object, ids);
        self.index.upsert(&document).await?;
        debug!(doc_id = %document.id, kind = %document.kind, "Refreshed index entry");
        Ok(object.id)
    }

    /// Flatten a repository object into a search document.
    pub fn build_document(
        &self,
        object: &RepositoryObject,
        ids: &HashMap<String, String>,
    ) -> SearchDocument {
        let classes: Vec<&str> = object
            .values(ns::RDF_TYPE)
            .iter()
            .filter_map(Term::as_iri)
            .collect();
        let kind = self.profile.infer_kind(classes.iter().copied());

        let mut document = SearchDocument::new(&object.id, kind);
        document.locations.push(object.location.clone());

        // Only repository-supplied metadata has a backing value here;
        // unknown allow-list entries are ignored.
        for field in &self.profile.metadata_fields {
            match field.as_str() {
                "fcrepo:created" => document.push(field, json!(object.created.to_rfc3339())),
                "fcrepo:lastModified" => document.push(field, json!(object.modified.to_rfc3339())),
                "fcrepo:uuid" => document.push(field, json!(object.id)),
                _ => {}
            }
        }

        for (predicate, values) in &object.properties {
            if predicate == ns::RDF_TYPE {
                for value in values {
                    if let Some(compacted) = value.as_iri().and_then(|iri| self.profile.compact(iri))
                    {
                        if !self.profile.is_excluded(&compacted) {
                            document.push("type", json!(compacted));
                        }
                    }
                }
                continue;
            }

            let key = self
                .profile
                .compact(predicate)
                .unwrap_or_else(|| predicate.clone());
            if self.profile.is_excluded(&key) {
                continue;
            }
            for value in values {
                document.push(&key, flatten_value(value, ids));
            }
        }

        document
    }
}

/// Flatten one property value: literals and blank labels by lexical form,
/// references by mapped document id when known, raw IRI otherwise.
fn flatten_value(value: &Term, ids: &HashMap<String, String>) -> serde_json::Value {
    match value {
        Term::Iri(iri) => match ids.get(iri) {
            Some(id) => json!(id),
            None => json!(iri),
        },
        _ => json!(value.lexical()),
    }
}

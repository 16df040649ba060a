//! Search index documents.
//!
//! A `SearchDocument` is the flattened form of a repository object: a map
//! of prefixed predicate names to value arrays, tagged with an inferred
//! `DocumentKind`, keyed by the repository identifier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::object::Location;

/// The category of a search index entry, inferred from the ontology
/// classes a subject is asserted to belong to.
///
/// This is a closed set; class IRIs map onto variants through the
/// vocabulary profile's kind table rather than any runtime type machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Work,
    Annotation,
    Authority,
    HeldItem,
    Person,
    Place,
    Provider,
    Title,
    Topic,
    Organization,
    Instance,
    /// Fallback when no configured class matches.
    Resource,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Annotation => "Annotation",
            Self::Authority => "Authority",
            Self::HeldItem => "HeldItem",
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Provider => "Provider",
            Self::Title => "Title",
            Self::Topic => "Topic",
            Self::Organization => "Organization",
            Self::Instance => "Instance",
            Self::Resource => "Resource",
        }
    }
}

impl Default for DocumentKind {
    fn default() -> Self {
        Self::Resource
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flattened repository object ready for upsert into the search index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    /// Repository-assigned identifier, used as the index document id.
    pub id: String,
    pub kind: DocumentKind,
    /// Locations this document is reachable at.
    pub locations: Vec<Location>,
    /// Flattened properties keyed by prefixed predicate name. Every value
    /// is an array; single values become one-element arrays.
    pub body: BTreeMap<String, Vec<Value>>,
}

impl SearchDocument {
    pub fn new(id: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            locations: Vec::new(),
            body: BTreeMap::new(),
        }
    }

    /// Append a value under a key, expanding the key to an array when
    /// needed.
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.body.entry(key.into()).or_default().push(value);
    }

    /// The wire body sent to the search index: flattened properties plus
    /// the kind tag and the location list.
    pub fn to_index_body(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, values) in &self.body {
            map.insert(key.clone(), Value::Array(values.clone()));
        }
        map.insert("kind".to_string(), json!(self.kind.as_str()));
        map.insert(
            "fcrepo:hasLocation".to_string(),
            json!(self
                .locations
                .iter()
                .map(|l| l.as_str())
                .collect::<Vec<_>>()),
        );
        Value::Object(map)
    }
}

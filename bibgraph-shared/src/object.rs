//! Repository locations and persisted objects.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::term::Term;

/// The opaque, repository-assigned address of a persisted object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Location {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

/// A persisted entity as returned by the object repository.
///
/// Properties are keyed by absolute predicate IRI; every value list keeps
/// the order in which the repository stored the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryObject {
    pub location: Location,
    /// Repository-assigned identifier. Search documents are keyed by this,
    /// never by the original subject identity.
    pub id: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<Term>>,
}

impl RepositoryObject {
    /// Values stored under a predicate IRI, empty when absent.
    pub fn values(&self, predicate: &str) -> &[Term] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_for_missing_predicate() {
        let object = RepositoryObject {
            location: Location::new("http://repo.example.org/rest/1"),
            id: "doc-1".to_string(),
            created: Utc::now(),
            modified: Utc::now(),
            properties: BTreeMap::new(),
        };
        assert!(object.values("http://bibframe.org/vocab/label").is_empty());
    }

    #[test]
    fn test_object_serde_round_trip() {
        let mut properties = BTreeMap::new();
        properties.insert(
            "http://bibframe.org/vocab/label".to_string(),
            vec![Term::literal("Moby Dick")],
        );
        let object = RepositoryObject {
            location: Location::new("http://repo.example.org/rest/1"),
            id: "doc-1".to_string(),
            created: Utc::now(),
            modified: Utc::now(),
            properties,
        };
        let json = serde_json::to_string(&object).unwrap();
        let back: RepositoryObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "doc-1");
        assert_eq!(back.values("http://bibframe.org/vocab/label").len(), 1);
    }
}

//! Response types for search index operations.

use serde_json::Value;

use bibgraph_shared::Location;

/// A single hit returned by an exact-match query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The hit's document id (the repository identifier).
    pub id: String,
    /// The stored location of the entity, when present in the source.
    pub location: Option<Location>,
    /// The full stored document.
    pub source: Value,
}

impl SearchHit {
    /// Build a hit from a raw search response entry, pulling the first
    /// stored location out of the source document.
    pub fn from_source(id: impl Into<String>, source: Value) -> Self {
        let location = source
            .get("fcrepo:hasLocation")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|v| v.as_str())
            .map(Location::new);
        Self {
            id: id.into(),
            location,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_source_extracts_location() {
        let hit = SearchHit::from_source(
            "doc-1",
            json!({
                "bf:label": ["Moby Dick"],
                "fcrepo:hasLocation": ["http://repo.example.org/rest/1"]
            }),
        );
        assert_eq!(hit.id, "doc-1");
        assert_eq!(
            hit.location.as_ref().map(|l| l.as_str()),
            Some("http://repo.example.org/rest/1")
        );
    }

    #[test]
    fn test_from_source_without_location() {
        let hit = SearchHit::from_source("doc-2", json!({"bf:label": ["x"]}));
        assert!(hit.location.is_none());
    }
}

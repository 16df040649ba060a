//! OpenSearch index settings and mappings.
//!
//! The mapping gives every identifying predicate a text field with a
//! `.raw` keyword subfield so deduplication can match literal values
//! exactly while the analyzed field stays available for discovery.

use serde_json::{json, Value};

use bibgraph_shared::VocabProfile;

/// Build the index settings and mappings for a vocabulary profile.
pub fn index_settings(profile: &VocabProfile) -> Value {
    let mut properties = serde_json::Map::new();

    for field in profile.identifying_fields() {
        properties.insert(
            field,
            json!({
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            }),
        );
    }

    properties.insert("kind".to_string(), json!({ "type": "keyword" }));
    properties.insert("type".to_string(), json!({ "type": "keyword" }));
    properties.insert(
        "fcrepo:hasLocation".to_string(),
        json!({ "type": "keyword" }),
    );
    properties.insert("fcrepo:uuid".to_string(), json!({ "type": "keyword" }));
    properties.insert("fcrepo:created".to_string(), json!({ "type": "date" }));
    properties.insert("fcrepo:lastModified".to_string(), json!({ "type": "date" }));

    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": properties
        }
    })
}

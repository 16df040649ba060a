//! OpenSearch query builders.

use serde_json::{json, Value};

/// Build an exact-match query on a field's `.raw` keyword subfield.
///
/// Hits are sorted by ascending document id so that dedup lookups are
/// deterministic regardless of relevance scoring.
pub fn build_exact_query(field: &str, value: &str, limit: usize) -> Value {
    json!({
        "query": {
            "term": {
                format!("{}.raw", field): {
                    "value": value
                }
            }
        },
        "sort": [
            { "_id": "asc" }
        ],
        "size": limit
    })
}

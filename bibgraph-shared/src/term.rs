//! Graph term and triple types.
//!
//! A `Term` is a node in the linked-data graph: a reference (IRI), a typed
//! literal, or an anonymous node whose label is only meaningful within a
//! single ingestion run.

use serde::{Deserialize, Serialize};

/// A single node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Term {
    /// A reference to another node, identified by IRI.
    Iri(String),
    /// A scalar value, optionally tagged with a language or datatype IRI.
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
    /// A blank node. The label is scoped to one ingestion run and carries
    /// no identity beyond it.
    Anonymous(String),
}

impl Term {
    /// Create an IRI term.
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri(value.into())
    }

    /// Create a plain literal term.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Create an anonymous (blank) node term.
    pub fn anonymous(label: impl Into<String>) -> Self {
        Self::Anonymous(label.into())
    }

    /// The lexical form of the term: the IRI, the literal value, or the
    /// blank node label.
    pub fn lexical(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::Literal { value, .. } => value,
            Self::Anonymous(label) => label,
        }
    }

    /// Returns the IRI if this term is a reference.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Self::Iri(_))
    }
}

/// A single (subject, predicate, object) statement.
///
/// Subjects are references or anonymous nodes; the model does not prevent a
/// literal subject, but `Graph::subjects` never yields one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_forms() {
        assert_eq!(Term::iri("http://example.org/a").lexical(), "http://example.org/a");
        assert_eq!(Term::literal("Moby Dick").lexical(), "Moby Dick");
        assert_eq!(Term::anonymous("b0").lexical(), "b0");
    }

    #[test]
    fn test_term_predicates() {
        assert!(Term::literal("x").is_literal());
        assert!(!Term::literal("x").is_iri());
        assert_eq!(Term::iri("urn:a").as_iri(), Some("urn:a"));
        assert_eq!(Term::anonymous("b0").as_iri(), None);
    }

    #[test]
    fn test_term_serde_shape() {
        let term = Term::literal("Moby Dick");
        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(json["type"], "literal");
        assert_eq!(json["value"]["value"], "Moby Dick");

        let back: Term = serde_json::from_value(json).unwrap();
        assert_eq!(back, term);
    }
}

//! Vocabulary profile.
//!
//! The profile is the data-driven configuration surface consumed by the
//! core: namespace prefixes, the priority-ordered identifying predicates
//! used for deduplication, the class-to-kind table for document typing,
//! and the field lists that drive index flattening. The defaults carry the
//! BIBFRAME vocabulary.

use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::graph::Graph;
use crate::term::Term;

/// Well-known namespace IRIs.
pub mod ns {
    pub const BF: &str = "http://bibframe.org/vocab/";
    pub const MADS: &str = "http://www.loc.gov/mads/rdf/v1#";
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    pub const FCREPO: &str = "http://fedora.info/definitions/v4/repository#";

    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
}

/// One identifying value drawn from a subject, paired with the index field
/// it must match exactly and, when known, the subject's primary class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Prefixed index field name, e.g. `bf:authorizedAccessPoint`.
    pub field: String,
    pub value: String,
    /// Primary `rdf:type` IRI of the subject, used by cache-backed
    /// resolution to key digests.
    pub class: Option<String>,
}

/// Configuration for vocabulary-dependent behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabProfile {
    /// (prefix, namespace IRI) pairs used to compact predicate names.
    pub prefixes: Vec<(String, String)>,
    /// Identifying predicate IRIs in resolution priority order.
    pub identifying_predicates: Vec<String>,
    /// Ordered class IRI to kind table. When several classes match, the
    /// last matching entry wins.
    pub kind_table: Vec<(String, DocumentKind)>,
    /// Prefixed metadata field names copied into search documents. Only
    /// names with a backing value on a repository object are honored:
    /// `fcrepo:created`, `fcrepo:lastModified`, and `fcrepo:uuid`. Other
    /// entries are ignored; removing a name drops that field from new
    /// documents.
    pub metadata_fields: Vec<String>,
    /// Prefixes whose properties are excluded from search documents
    /// (unless allow-listed above).
    pub excluded_prefixes: Vec<String>,
    /// Name of the search index backing deduplication.
    pub index_name: String,
}

impl Default for VocabProfile {
    fn default() -> Self {
        Self {
            prefixes: vec![
                ("bf".to_string(), ns::BF.to_string()),
                ("mads".to_string(), ns::MADS.to_string()),
                ("rdf".to_string(), ns::RDF.to_string()),
                ("rdfs".to_string(), ns::RDFS.to_string()),
                ("owl".to_string(), ns::OWL.to_string()),
                ("fcrepo".to_string(), ns::FCREPO.to_string()),
            ],
            identifying_predicates: vec![
                format!("{}authorizedAccessPoint", ns::BF),
                format!("{}label", ns::BF),
                format!("{}authoritativeLabel", ns::MADS),
                format!("{}titleValue", ns::BF),
            ],
            kind_table: vec![
                (format!("{}Work", ns::BF), DocumentKind::Work),
                (format!("{}Annotation", ns::BF), DocumentKind::Annotation),
                (format!("{}Authority", ns::BF), DocumentKind::Authority),
                (format!("{}HeldItem", ns::BF), DocumentKind::HeldItem),
                (format!("{}Person", ns::BF), DocumentKind::Person),
                (format!("{}Place", ns::BF), DocumentKind::Place),
                (format!("{}Provider", ns::BF), DocumentKind::Provider),
                (format!("{}Title", ns::BF), DocumentKind::Title),
                (format!("{}Topic", ns::BF), DocumentKind::Topic),
                (format!("{}Organization", ns::BF), DocumentKind::Organization),
                (format!("{}Instance", ns::BF), DocumentKind::Instance),
            ],
            metadata_fields: vec![
                "fcrepo:created".to_string(),
                "fcrepo:lastModified".to_string(),
                "fcrepo:uuid".to_string(),
            ],
            excluded_prefixes: vec!["fcrepo".to_string(), "owl".to_string()],
            index_name: "bibframe".to_string(),
        }
    }
}

impl VocabProfile {
    /// Compact an absolute IRI to its prefixed name, when a configured
    /// namespace matches.
    pub fn compact(&self, iri: &str) -> Option<String> {
        for (prefix, namespace) in &self.prefixes {
            if let Some(local) = iri.strip_prefix(namespace.as_str()) {
                return Some(format!("{}:{}", prefix, local));
            }
        }
        None
    }

    /// The prefix part of a compacted name, e.g. `fcrepo` for
    /// `fcrepo:uuid`.
    pub fn is_excluded(&self, compacted: &str) -> bool {
        compacted
            .split_once(':')
            .map(|(prefix, _)| self.excluded_prefixes.iter().any(|p| p == prefix))
            .unwrap_or(false)
    }

    /// Index field names for the identifying predicates, in priority
    /// order.
    pub fn identifying_fields(&self) -> Vec<String> {
        self.identifying_predicates
            .iter()
            .map(|iri| self.compact(iri).unwrap_or_else(|| iri.clone()))
            .collect()
    }

    /// Identifying candidates for a subject: every non-blank literal value
    /// found under the identifying predicates, in predicate priority order
    /// then value order.
    pub fn candidates(&self, graph: &Graph, subject: &Term) -> Vec<Candidate> {
        let class = graph
            .objects(subject, ns::RDF_TYPE)
            .into_iter()
            .find_map(|t| t.as_iri().map(str::to_string));

        let mut out = Vec::new();
        for predicate in &self.identifying_predicates {
            let field = self
                .compact(predicate)
                .unwrap_or_else(|| predicate.clone());
            for object in graph.objects(subject, predicate) {
                let value = object.lexical().trim();
                if value.is_empty() {
                    continue;
                }
                out.push(Candidate {
                    field: field.clone(),
                    value: value.to_string(),
                    class: class.clone(),
                });
            }
        }
        out
    }

    /// Infer the document kind from a set of class IRIs. The table is
    /// walked in order and the last matching entry wins; subjects with no
    /// listed class fall back to `Resource`.
    pub fn infer_kind<'a>(&self, classes: impl IntoIterator<Item = &'a str>) -> DocumentKind {
        let classes: Vec<&str> = classes.into_iter().collect();
        let mut kind = DocumentKind::Resource;
        for (class_iri, table_kind) in &self.kind_table {
            if classes.iter().any(|c| c == class_iri) {
                kind = *table_kind;
            }
        }
        kind
    }
}

/// Normalize an identifying value for use as a dedup key or digest input:
/// trimmed, inner whitespace collapsed, case preserved.
pub fn normalize_identifier(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

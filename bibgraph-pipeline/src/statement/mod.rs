//! Statement rendering.
//!
//! Renders a subject's properties into the wire statement language the
//! object repository understands: Turtle documents for creates, SPARQL
//! `INSERT DATA` updates for patches. Relation-valued properties are
//! deferred to patch statements because their targets may not have
//! resolved locations at create time.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use bibgraph_shared::profile::ns;
use bibgraph_shared::{Graph, Location, Statement, Term, VocabProfile};

/// Renders create and patch statements for one vocabulary profile.
#[derive(Clone)]
pub struct StatementBuilder {
    profile: Arc<VocabProfile>,
    provenance: bool,
}

impl StatementBuilder {
    pub fn new(profile: Arc<VocabProfile>) -> Self {
        Self {
            profile,
            provenance: false,
        }
    }

    /// Also assert `owl:sameAs` back to the original subject identity in
    /// every patch, so repository objects stay traceable to their source.
    pub fn with_provenance(mut self) -> Self {
        self.provenance = true;
        self
    }

    /// Build a create statement: literal-valued properties plus type
    /// assertions only.
    pub fn build_create(&self, subject: &Term, graph: &Graph) -> Statement {
        let mut text = self.prefix_header("@prefix", " .");
        for (predicate, object) in graph.predicate_objects(subject) {
            if object.is_literal() || predicate == ns::RDF_TYPE {
                text.push_str(&self.insert_row(predicate, object));
            }
        }
        Statement::turtle(text)
    }

    /// Build a patch statement for the subject's relation-valued triples.
    /// Objects present in the mapping are rewritten to their resolved
    /// locations; anything else passes through verbatim.
    pub fn build_patch(
        &self,
        subject: &Term,
        graph: &Graph,
        mapping: &HashMap<Term, Location>,
    ) -> Statement {
        let mut text = self.prefix_header("PREFIX", "");
        text.push_str("INSERT DATA {\n");
        if self.provenance {
            text.push_str(&self.insert_row(ns::OWL_SAME_AS, subject));
        }
        for (predicate, object) in graph.predicate_objects(subject) {
            if object.is_literal() || predicate == ns::RDF_TYPE {
                continue;
            }
            match mapping.get(object) {
                Some(location) => {
                    let resolved = Term::iri(location.as_str());
                    text.push_str(&self.insert_row(predicate, &resolved));
                }
                None => text.push_str(&self.insert_row(predicate, object)),
            }
        }
        text.push('}');
        Statement::sparql_update(text)
    }

    /// Build the minimal placeholder statement used when a subject's real
    /// create request fails: a same-as link back to the original identity
    /// for later reconciliation.
    pub fn build_placeholder(&self, subject: &Term) -> Statement {
        let mut text = self.prefix_header("@prefix", " .");
        let identity = Term::literal(subject.lexical());
        text.push_str(&self.insert_row(ns::OWL_SAME_AS, &identity));
        Statement::turtle(text)
    }

    fn prefix_header(&self, keyword: &str, terminator: &str) -> String {
        let mut header = String::new();
        for (prefix, namespace) in &self.profile.prefixes {
            header.push_str(&format!(
                "{} {}: <{}>{}\n",
                keyword, prefix, namespace, terminator
            ));
        }
        header
    }

    /// Render one statement row for a predicate and object.
    fn insert_row(&self, predicate: &str, object: &Term) -> String {
        let mut row = String::from("<> ");
        match self.profile.compact(predicate) {
            Some(compacted) => row.push_str(&compacted),
            None => row.push_str(&format!("<{}>", predicate)),
        }
        row.push(' ');
        match object {
            Term::Iri(iri) => {
                // References that are not fetchable URLs are kept as
                // literals; converters emit loose identifiers in subject
                // position that the repository cannot dereference.
                if is_url(iri) {
                    row.push_str(&format!("<{}>", iri));
                } else {
                    row.push_str(&quote_literal(iri));
                }
            }
            Term::Literal { value, .. } => row.push_str(&quote_literal(value)),
            Term::Anonymous(label) => row.push_str(&quote_literal(label)),
        }
        row.push_str(" .\n");
        row
    }
}

/// Whether an IRI is a fetchable URL (http or ftp family).
fn is_url(iri: &str) -> bool {
    match Url::parse(iri) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "ftp" | "ftps"),
        Err(_) => false,
    }
}

/// Quote a literal value without corrupting the statement syntax.
///
/// Values with an embedded double quote or a line break switch to
/// long-form `'''` delimiters (plain quotes cannot span lines); values
/// that also contain `'''` fall back to backslash escaping inside plain
/// quotes.
fn quote_literal(value: &str) -> String {
    let needs_long_form = value.contains('"') || value.contains('\n') || value.contains('\r');
    if !needs_long_form {
        format!("\"{}\"", value)
    } else if !value.contains("'''") {
        format!("'''{}'''", value)
    } else {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        format!("\"{}\"", escaped)
    }
}

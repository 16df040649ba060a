//! In-memory triple graph.
//!
//! The graph is an unordered collection of triples produced by an external
//! parser or converter. Subjects are derived as the distinct set of terms
//! appearing in subject position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::term::{Term, Triple};

/// An unordered collection of triples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples(triples: Vec<Triple>) -> Self {
        Self { triples }
    }

    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Convenience for building graphs in tests and converters.
    pub fn insert(&mut self, subject: Term, predicate: impl Into<String>, object: Term) {
        self.triples.push(Triple::new(subject, predicate, object));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Distinct subjects in first-appearance order. Literal subjects are
    /// skipped; only references and anonymous nodes can be materialized.
    pub fn subjects(&self) -> Vec<Term> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for triple in &self.triples {
            if triple.subject.is_literal() {
                continue;
            }
            if seen.insert(&triple.subject) {
                out.push(triple.subject.clone());
            }
        }
        out
    }

    /// All (predicate, object) pairs for a subject.
    pub fn predicate_objects<'a>(
        &'a self,
        subject: &'a Term,
    ) -> impl Iterator<Item = (&'a str, &'a Term)> {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject)
            .map(|t| (t.predicate.as_str(), &t.object))
    }

    /// All objects for a (subject, predicate) pair.
    pub fn objects<'a>(&'a self, subject: &'a Term, predicate: &'a str) -> Vec<&'a Term> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Rewrite every occurrence of `from` (subject or object position) to
    /// `to`. Used by cache-backed resolution to fold an incoming subject
    /// onto its previously established canonical identity.
    pub fn rewrite_term(&mut self, from: &Term, to: &Term) -> usize {
        let mut rewritten = 0;
        for triple in &mut self.triples {
            if &triple.subject == from {
                triple.subject = to.clone();
                rewritten += 1;
            }
            if &triple.object == from {
                triple.object = to.clone();
                rewritten += 1;
            }
        }
        rewritten
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let s1 = Term::iri("http://example.org/work/1");
        let s2 = Term::anonymous("b0");
        graph.insert(s1.clone(), "http://bibframe.org/vocab/label", Term::literal("Moby Dick"));
        graph.insert(s1.clone(), "http://bibframe.org/vocab/label", Term::literal("Moby-Dick"));
        graph.insert(s2.clone(), "http://bibframe.org/vocab/derivedFrom", s1.clone());
        graph
    }

    #[test]
    fn test_subjects_are_distinct_and_ordered() {
        let graph = sample();
        let subjects = graph.subjects();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0], Term::iri("http://example.org/work/1"));
        assert_eq!(subjects[1], Term::anonymous("b0"));
    }

    #[test]
    fn test_objects_preserve_order() {
        let graph = sample();
        let s1 = Term::iri("http://example.org/work/1");
        let labels = graph.objects(&s1, "http://bibframe.org/vocab/label");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].lexical(), "Moby Dick");
        assert_eq!(labels[1].lexical(), "Moby-Dick");
    }

    #[test]
    fn test_rewrite_term_covers_both_positions() {
        let mut graph = sample();
        let from = Term::iri("http://example.org/work/1");
        let to = Term::iri("http://repo.example.org/rest/abc");
        let rewritten = graph.rewrite_term(&from, &to);
        // two subject positions plus one object position
        assert_eq!(rewritten, 3);
        assert!(graph.triples().all(|t| t.subject != from && t.object != from));
    }

    #[test]
    fn test_graph_serde_round_trip() {
        let graph = sample();
        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }
}

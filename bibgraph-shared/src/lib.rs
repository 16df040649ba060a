//! # Bibgraph Shared
//!
//! Shared types and data structures for the bibgraph ingestion system.
//!
//! This crate defines the in-memory graph model (terms, triples, graphs),
//! the repository and search document types, the vocabulary profile that
//! drives deduplication and index flattening, and the run report produced
//! by an ingestion.

pub mod document;
pub mod graph;
pub mod object;
pub mod profile;
pub mod report;
pub mod statement;
pub mod term;

pub use document::{DocumentKind, SearchDocument};
pub use graph::Graph;
pub use object::{Location, RepositoryObject};
pub use profile::{Candidate, VocabProfile};
pub use report::{Phase, RunReport, RunState, SubjectFailure};
pub use statement::{Statement, StatementSyntax};
pub use term::{Term, Triple};

//! # Bibgraph Pipeline
//!
//! This crate provides the core two-phase graph ingestion pipeline:
//! resolving each graph subject against previously indexed data,
//! materializing unresolved subjects as new repository objects, rewriting
//! cross-references using resolved identities, and keeping the search
//! index consistent with the repository.
//!
//! ## Architecture
//!
//! 1. **Statements**: render a subject's properties into create and patch
//!    statements for the object repository
//! 2. **Resolvers**: map identifying literals to previously established
//!    canonical locations (search-index backed, cache backed, or both)
//! 3. **Indexer**: flatten repository objects into search documents
//! 4. **Orchestrator**: drive the materialize and link phases

pub mod errors;
pub mod indexer;
pub mod orchestrator;
pub mod resolver;
pub mod statement;

pub use errors::IngestError;
pub use indexer::GraphIndexer;
pub use orchestrator::{IngestOrchestrator, OrchestratorConfig};
pub use resolver::{CachedResolver, IndexResolver, MemoryCache, ResolutionCache, Resolver};
pub use statement::StatementBuilder;

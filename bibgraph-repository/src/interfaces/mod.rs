//! Abstract interfaces for the stores the pipeline depends on.

mod object_repository;
mod search_index;

pub use object_repository::ObjectRepository;
pub use search_index::SearchIndex;

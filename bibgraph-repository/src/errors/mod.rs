//! Error types for repository and search operations.

mod repository_error;
mod search_error;

pub use repository_error::RepositoryError;
pub use search_error::SearchError;

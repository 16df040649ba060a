//! Object repository trait definition.
//!
//! This module defines the abstract interface for the persistent object
//! store, allowing for different backend implementations (Fedora-style
//! REST repository, mock, etc.).

use async_trait::async_trait;

use crate::errors::RepositoryError;
use bibgraph_shared::{Location, RepositoryObject, Statement};

/// Abstract interface for object repository operations.
///
/// Implementations can be swapped for different backends, enabling easy
/// testing with mock implementations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async
/// tasks.
#[async_trait]
pub trait ObjectRepository: Send + Sync {
    /// Create a new object from a create statement.
    ///
    /// # Returns
    ///
    /// * `Ok(Location)` - The repository-assigned location of the new object
    /// * `Err(RepositoryError::Transport)` - On network or protocol failure
    async fn create(&self, statement: &Statement) -> Result<Location, RepositoryError>;

    /// Apply a patch statement to an existing object.
    ///
    /// Patch statements are pure property assertions, so retrying a patch
    /// at the caller's discretion is safe.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the patch was applied
    /// * `Err(RepositoryError::Transport)` - On network or protocol failure
    async fn patch(&self, location: &Location, statement: &Statement)
        -> Result<(), RepositoryError>;

    /// Fetch the current state of an object.
    ///
    /// # Returns
    ///
    /// * `Ok(RepositoryObject)` - The object's property graph and metadata
    /// * `Err(RepositoryError::NotFound)` - If the location is unknown
    /// * `Err(RepositoryError::Transport)` - On network or protocol failure
    async fn fetch(&self, location: &Location) -> Result<RepositoryObject, RepositoryError>;
}

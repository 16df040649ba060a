//! Object repository error types.

use thiserror::Error;

/// Errors that can occur talking to the object repository.
///
/// A request timeout is reported as `Transport`; callers treat the two
/// identically.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Network or protocol failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Fetch on a location the repository does not know.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured base location or a returned location is not a
    /// usable URI.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// The repository response could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RepositoryError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a not-found error.
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound(location.into())
    }

    /// Create an invalid-location error.
    pub fn invalid_location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts collapse into transport failures by design.
        Self::Transport(err.to_string())
    }
}

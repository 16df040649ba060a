//! Wire statements sent to the object repository.

use serde::{Deserialize, Serialize};

/// The statement syntax, which determines the request content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementSyntax {
    /// Turtle document describing a new object (`create`).
    Turtle,
    /// SPARQL Update document addressed to an existing object (`patch`).
    SparqlUpdate,
}

impl StatementSyntax {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Turtle => "text/turtle",
            Self::SparqlUpdate => "application/sparql-update",
        }
    }
}

/// A rendered statement document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub syntax: StatementSyntax,
    pub text: String,
}

impl Statement {
    pub fn turtle(text: impl Into<String>) -> Self {
        Self {
            syntax: StatementSyntax::Turtle,
            text: text.into(),
        }
    }

    pub fn sparql_update(text: impl Into<String>) -> Self {
        Self {
            syntax: StatementSyntax::SparqlUpdate,
            text: text.into(),
        }
    }
}

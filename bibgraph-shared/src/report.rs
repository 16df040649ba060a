//! Ingestion run state and reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The ingestion state machine. Per-subject failures never move a run to
/// `Failed`; only run-fatal conditions (index bootstrap) do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    MaterializingSubjects,
    LinkingSubjects,
    Done,
    Failed,
}

/// The phase a per-subject failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Materialize,
    Link,
}

/// A per-subject failure, recorded with enough context to reproduce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectFailure {
    /// The subject's external identity.
    pub subject: String,
    pub phase: Phase,
    /// Resolved location, when one was established before the failure.
    pub location: Option<String>,
    pub error: String,
}

/// Summary of a completed ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub state: RunState,
    /// Distinct subjects seen in the input graph.
    pub subjects_total: usize,
    /// Subjects materialized through a repository create.
    pub created: usize,
    /// Subjects resolved to a previously indexed location with no create.
    pub resolved: usize,
    /// Subjects whose relations were patched and re-indexed.
    pub linked: usize,
    pub failures: Vec<SubjectFailure>,
    /// Whether the run stopped early on a cancellation signal.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn failed_in(&self, phase: Phase) -> usize {
        self.failures.iter().filter(|f| f.phase == phase).count()
    }
}

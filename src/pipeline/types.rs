//! Pipeline run types

use crate::error::Error;
use crate::sink::OutputArtifact;

/// A query that was reported and skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedQuery {
    /// Query name, or `query file` for an unparseable line
    pub name: String,
    /// Error message
    pub reason: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Queries written and forwarded
    pub executed: usize,
    /// Queries skipped after a per-query error
    pub skipped: Vec<SkippedQuery>,
    /// Results files written in this run
    pub artifacts: Vec<OutputArtifact>,
}

impl RunReport {
    pub(crate) fn record(&mut self, artifact: OutputArtifact) {
        self.executed += 1;
        self.artifacts.push(artifact);
    }

    pub(crate) fn skip(&mut self, name: impl Into<String>, err: &Error) {
        self.skipped.push(SkippedQuery {
            name: name.into(),
            reason: err.to_string(),
        });
    }

    /// Whether every query succeeded
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Process exit code: 0 for a clean run, 2 when a query was skipped
    pub fn exit_code(&self) -> i32 {
        if self.is_clean() {
            0
        } else {
            2
        }
    }
}

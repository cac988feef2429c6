//! Job handles and terminal outcomes.

use serde::{Deserialize, Serialize};

use crate::envelope::SolverInfo;

/// Opaque job identifier returned by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle of one job as seen from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Polling,
    CompletedWithSolution,
    CompletedNoSolution,
    Errored,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::CompletedWithSolution | JobStatus::CompletedNoSolution | JobStatus::Errored
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::Polling => "polling",
            JobStatus::CompletedWithSolution => "completed_with_solution",
            JobStatus::CompletedNoSolution => "completed_no_solution",
            JobStatus::Errored => "errored",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a polled job finished.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome<T> {
    /// Completed and returned a solution.
    Solved(T),
    /// Completed without a solution payload (e.g. an evaluation run).
    NoSolution,
    /// The solver's latest log entry is an error.
    SolverError {
        message: String,
        logs: Vec<SolverInfo>,
        /// Decoded if the server attached a payload anyway.
        solution: Option<T>,
    },
}

impl<T> JobOutcome<T> {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Solved(_) => JobStatus::CompletedWithSolution,
            JobOutcome::NoSolution => JobStatus::CompletedNoSolution,
            JobOutcome::SolverError { .. } => JobStatus::Errored,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, JobOutcome::Solved(_))
    }

    pub fn is_solver_error(&self) -> bool {
        matches!(self, JobOutcome::SolverError { .. })
    }

    /// The solution, if any, regardless of how the job ended.
    pub fn solution(self) -> Option<T> {
        match self {
            JobOutcome::Solved(value) => Some(value),
            JobOutcome::NoSolution => None,
            JobOutcome::SolverError { solution, .. } => solution,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            JobOutcome::SolverError { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> JobOutcome<U> {
        match self {
            JobOutcome::Solved(value) => JobOutcome::Solved(f(value)),
            JobOutcome::NoSolution => JobOutcome::NoSolution,
            JobOutcome::SolverError {
                message,
                logs,
                solution,
            } => JobOutcome::SolverError {
                message,
                logs,
                solution: solution.map(f),
            },
        }
    }
}

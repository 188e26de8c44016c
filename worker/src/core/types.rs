//! Shared deterministic types for worker core logic.
//!
//! These types define stable contracts between the worker loop and its
//! collaborators. They do not depend on external state or I/O.

use std::fmt;

use serde::Serialize;

use super::state::TaskState;

/// A task file and the queue state it currently sits in.
///
/// The file name is the task's identity and never changes across moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: String,
    pub state: TaskState,
}

impl Task {
    pub fn new(name: impl Into<String>, state: TaskState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// Exit status of an agent invocation. The agent's file edits are not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentOutcome {
    Succeeded,
    /// Non-zero exit. `exit_code` is `None` when the process was killed by a signal.
    Failed { exit_code: Option<i32> },
}

impl AgentOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, AgentOutcome::Succeeded)
    }
}

/// Result of one build attempt. Consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// `None` when the build was killed (signal or timeout).
    pub exit_code: Option<i32>,
    /// Standard output followed by standard error.
    pub output: String,
}

impl BuildResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Why a task ended in `failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The implementation prompt was rejected by the agent; no build ran.
    ImplementationFailed,
    /// The agent failed while fixing the output of build `attempt`.
    FixFailed { attempt: u32 },
    /// Every build attempt failed.
    AttemptsExhausted { attempts: u32 },
    /// An I/O or spawn error ended processing.
    Error(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ImplementationFailed => f.write_str("implementation failed"),
            FailureReason::FixFailed { attempt } => {
                write!(f, "fix after build attempt {attempt} failed")
            }
            FailureReason::AttemptsExhausted { attempts } => {
                write!(f, "build still failing after {attempts} attempts")
            }
            FailureReason::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Result of a single worker iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// No pending task was found.
    Idle,
    /// The task was moved to `done`; `attempts` builds were run.
    Completed { task: String, attempts: u32 },
    /// The task was moved to `failed`.
    Failed { task: String, reason: FailureReason },
}

impl IterationOutcome {
    pub fn task(&self) -> Option<&str> {
        match self {
            IterationOutcome::Idle => None,
            IterationOutcome::Completed { task, .. } | IterationOutcome::Failed { task, .. } => {
                Some(task)
            }
        }
    }
}

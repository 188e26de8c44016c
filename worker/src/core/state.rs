//! Task lifecycle states and the transitions allowed between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Queue state of a task. Each state maps to one directory in the task store.
///
/// ```text
/// pending -> in_progress -> done
///                        \-> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl TaskState {
    /// Every state, in lifecycle order.
    pub const ALL: [TaskState; 4] = [
        TaskState::Pending,
        TaskState::InProgress,
        TaskState::Done,
        TaskState::Failed,
    ];

    /// Directory name backing this state.
    pub fn dir_name(self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::InProgress => "in_progress",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }

    /// Terminal states are permanent archives; nothing leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }

    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::InProgress)
                | (TaskState::InProgress, TaskState::Done)
                | (TaskState::InProgress, TaskState::Failed)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        let allowed: Vec<(TaskState, TaskState)> = TaskState::ALL
            .iter()
            .flat_map(|from| TaskState::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            allowed,
            vec![
                (TaskState::Pending, TaskState::InProgress),
                (TaskState::InProgress, TaskState::Done),
                (TaskState::InProgress, TaskState::Failed),
            ]
        );
    }

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for state in TaskState::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(!TaskState::ALL.iter().any(|to| state.can_transition_to(*to)));
        }
    }

    #[test]
    fn dir_names_are_stable() {
        let names: Vec<&str> = TaskState::ALL.iter().map(|s| s.dir_name()).collect();
        assert_eq!(names, vec!["pending", "in_progress", "done", "failed"]);
    }
}

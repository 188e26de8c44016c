//! Queue summary for `ai-worker status`.

use anyhow::Result;
use serde::Serialize;

use crate::core::state::TaskState;
use crate::io::task_store::TaskStore;

/// Task names per queue state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub pending: Vec<String>,
    pub in_progress: Vec<String>,
    pub done: Vec<String>,
    pub failed: Vec<String>,
}

impl QueueStatus {
    pub fn tasks(&self, state: TaskState) -> &[String] {
        match state {
            TaskState::Pending => &self.pending,
            TaskState::InProgress => &self.in_progress,
            TaskState::Done => &self.done,
            TaskState::Failed => &self.failed,
        }
    }

    /// One `state: count` line per state, followed by indented task names.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for state in TaskState::ALL {
            let tasks = self.tasks(state);
            out.push_str(&format!("{state}: {}\n", tasks.len()));
            for name in tasks {
                out.push_str(&format!("  {name}\n"));
            }
        }
        out
    }
}

pub fn queue_status<S: TaskStore>(store: &S) -> Result<QueueStatus> {
    Ok(QueueStatus {
        pending: store.list(TaskState::Pending)?,
        in_progress: store.list(TaskState::InProgress)?,
        done: store.list(TaskState::Done)?,
        failed: store.list(TaskState::Failed)?,
    })
}

//! Directory-backed task queue.
//!
//! Each [`TaskState`] is a sub-directory of the store root. A task is a `.md`
//! file; moving it between directories is its state transition.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use crate::core::state::TaskState;
use crate::core::types::Task;

/// Extension that marks a file in the queue as a task.
pub const TASK_EXTENSION: &str = "md";

/// Storage behind the worker's task lifecycle.
///
/// The worker only talks to this trait, so tests can swap in an in-memory store.
pub trait TaskStore {
    /// Create every state directory. Idempotent.
    fn ensure_directories(&self) -> Result<()>;

    /// The name-sorted first task in `pending`, if any.
    fn next_pending(&self) -> Result<Option<Task>>;

    /// Move `task` to `target`, keeping its name. Returns the relocated task.
    fn move_to(&self, task: &Task, target: TaskState) -> Result<Task>;

    /// Full UTF-8 text of the task.
    fn read(&self, task: &Task) -> Result<String>;

    /// Names of tasks in `state`, sorted.
    fn list(&self, state: TaskState) -> Result<Vec<String>>;
}

/// [`TaskStore`] on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirTaskStore {
    root: PathBuf,
}

impl DirTaskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self, state: TaskState) -> PathBuf {
        self.root.join(state.dir_name())
    }

    pub fn task_path(&self, task: &Task) -> PathBuf {
        self.state_dir(task.state).join(&task.name)
    }
}

impl TaskStore for DirTaskStore {
    fn ensure_directories(&self) -> Result<()> {
        for state in TaskState::ALL {
            let dir = self.state_dir(state);
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(())
    }

    fn next_pending(&self) -> Result<Option<Task>> {
        let first = self.list(TaskState::Pending)?.into_iter().next();
        Ok(first.map(|name| Task::new(name, TaskState::Pending)))
    }

    fn move_to(&self, task: &Task, target: TaskState) -> Result<Task> {
        if !task.state.can_transition_to(target) {
            bail!(
                "invalid transition for {}: {} -> {}",
                task.name,
                task.state,
                target
            );
        }
        let source = self.task_path(task);
        if !source.is_file() {
            bail!("task {} not found at {}", task.name, source.display());
        }
        let moved = Task::new(task.name.clone(), target);
        let destination = self.task_path(&moved);
        // rename(2) silently replaces an existing file; refuse instead.
        if destination.exists() {
            bail!(
                "task {} already exists at {}",
                task.name,
                destination.display()
            );
        }
        fs::rename(&source, &destination).with_context(|| {
            format!("move {} to {}", source.display(), destination.display())
        })?;
        debug!(task = %task.name, from = %task.state, to = %target, "task moved");
        Ok(moved)
    }

    fn read(&self, task: &Task) -> Result<String> {
        let path = self.task_path(task);
        fs::read_to_string(&path).with_context(|| format!("read task {}", path.display()))
    }

    fn list(&self, state: TaskState) -> Result<Vec<String>> {
        let dir = self.state_dir(state);
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
            let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != TASK_EXTENSION) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!(name = ?name, "skipping task with non-UTF-8 file name"),
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pending(names: &[&str]) -> (tempfile::TempDir, DirTaskStore) {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = DirTaskStore::new(temp.path().join("ai_tasks"));
        store.ensure_directories().expect("ensure dirs");
        for name in names {
            fs::write(
                store.state_dir(TaskState::Pending).join(name),
                format!("task {name}"),
            )
            .expect("write task");
        }
        (temp, store)
    }

    #[test]
    fn ensure_directories_is_idempotent() {
        let (_temp, store) = store_with_pending(&[]);
        store.ensure_directories().expect("second call");
        for state in TaskState::ALL {
            assert!(store.state_dir(state).is_dir(), "{state} missing");
        }
    }

    #[test]
    fn next_pending_on_empty_queue_is_none() {
        let (_temp, store) = store_with_pending(&[]);
        assert_eq!(store.next_pending().expect("next"), None);
    }

    #[test]
    fn next_pending_picks_first_by_name() {
        let (_temp, store) = store_with_pending(&["b-task.md", "a-task.md", "c-task.md"]);
        let task = store.next_pending().expect("next").expect("task");
        assert_eq!(task, Task::new("a-task.md", TaskState::Pending));
    }

    #[test]
    fn next_pending_ignores_non_task_files() {
        let (_temp, store) = store_with_pending(&["notes.txt", "z-task.md"]);
        fs::create_dir(store.state_dir(TaskState::Pending).join("a-dir.md")).expect("mkdir");
        let task = store.next_pending().expect("next").expect("task");
        assert_eq!(task.name, "z-task.md");
    }

    #[test]
    fn move_to_preserves_name_and_content() {
        let (_temp, store) = store_with_pending(&["feature.md"]);
        let task = store.next_pending().expect("next").expect("task");

        let moved = store.move_to(&task, TaskState::InProgress).expect("move");
        assert_eq!(moved, Task::new("feature.md", TaskState::InProgress));
        assert!(!store.task_path(&task).exists());
        assert_eq!(store.read(&moved).expect("read"), "task feature.md");

        let done = store.move_to(&moved, TaskState::Done).expect("move");
        assert_eq!(store.list(TaskState::Done).expect("list"), vec!["feature.md"]);
        assert!(store.list(TaskState::InProgress).expect("list").is_empty());
        assert_eq!(done.name, task.name);
    }

    #[test]
    fn move_to_rejects_invalid_transition() {
        let (_temp, store) = store_with_pending(&["feature.md"]);
        let task = store.next_pending().expect("next").expect("task");
        let err = store.move_to(&task, TaskState::Done).unwrap_err();
        assert!(err.to_string().contains("invalid transition"));
        assert!(store.task_path(&task).exists());
    }

    #[test]
    fn move_to_fails_when_source_missing() {
        let (_temp, store) = store_with_pending(&[]);
        let ghost = Task::new("ghost.md", TaskState::Pending);
        let err = store.move_to(&ghost, TaskState::InProgress).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn move_to_refuses_to_overwrite() {
        let (_temp, store) = store_with_pending(&["dup.md"]);
        fs::write(store.state_dir(TaskState::InProgress).join("dup.md"), "other")
            .expect("write");
        let task = store.next_pending().expect("next").expect("task");

        let err = store.move_to(&task, TaskState::InProgress).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(store.state_dir(TaskState::InProgress).join("dup.md"))
                .expect("read"),
            "other"
        );
    }

    #[test]
    fn read_rejects_invalid_utf8() {
        let (_temp, store) = store_with_pending(&[]);
        fs::write(
            store.state_dir(TaskState::Pending).join("bad.md"),
            [0xff, 0xfe, 0xfd],
        )
        .expect("write");
        let task = store.next_pending().expect("next").expect("task");
        assert!(store.read(&task).is_err());
    }
}

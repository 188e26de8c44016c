//! Test-only fakes for the worker's collaborators.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
#[cfg(feature = "test-support")]
use std::fs;
#[cfg(feature = "test-support")]
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};

use crate::core::state::TaskState;
use crate::core::types::{AgentOutcome, BuildResult, Task};
use crate::io::agent::Agent;
use crate::io::build::BuildRunner;
use crate::io::sleep::Sleeper;
#[cfg(feature = "test-support")]
use crate::io::task_store::DirTaskStore;
use crate::io::task_store::TaskStore;

/// Successful build with empty output.
pub fn build_ok() -> BuildResult {
    BuildResult {
        exit_code: Some(0),
        output: String::new(),
    }
}

/// Failed build (exit code 1) with the given output.
pub fn build_fail(output: &str) -> BuildResult {
    BuildResult {
        exit_code: Some(1),
        output: output.to_string(),
    }
}

/// Agent that replays scripted outcomes and records every prompt.
///
/// `Err` entries simulate a failure to start the agent. Running past the end
/// of the script is an error.
pub struct ScriptedAgent {
    script: RefCell<VecDeque<Result<AgentOutcome, String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new(script: Vec<Result<AgentOutcome, String>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Agent for ScriptedAgent {
    fn run(&self, prompt: &str) -> Result<AgentOutcome> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.script.borrow_mut().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted agent exhausted")),
        }
    }
}

/// Build runner that replays scripted results. Running past the end is an error.
pub struct ScriptedBuildRunner {
    script: RefCell<VecDeque<BuildResult>>,
    runs: RefCell<u32>,
}

impl ScriptedBuildRunner {
    pub fn new(script: Vec<BuildResult>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            runs: RefCell::new(0),
        }
    }

    pub fn runs(&self) -> u32 {
        *self.runs.borrow()
    }
}

impl BuildRunner for ScriptedBuildRunner {
    fn run(&self) -> Result<BuildResult> {
        *self.runs.borrow_mut() += 1;
        self.script
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted build runner exhausted"))
    }
}

/// Sleeper that returns immediately and remembers what it was asked for.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

/// In-memory [`TaskStore`] keyed by task name.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RefCell<BTreeMap<String, (TaskState, String)>>,
    pending_error: RefCell<Option<String>>,
    blocked_moves: RefCell<Vec<(String, TaskState)>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: &str, state: TaskState, content: &str) {
        self.tasks
            .borrow_mut()
            .insert(name.to_string(), (state, content.to_string()));
    }

    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        self.tasks.borrow().get(name).map(|(state, _)| *state)
    }

    /// Make the next `next_pending` call fail with `message`.
    pub fn fail_next_pending(&self, message: &str) {
        *self.pending_error.borrow_mut() = Some(message.to_string());
    }

    /// Make every move of `name` into `target` fail, as if the target
    /// directory already held a file with that name.
    pub fn block_move(&self, name: &str, target: TaskState) {
        self.blocked_moves
            .borrow_mut()
            .push((name.to_string(), target));
    }
}

impl TaskStore for MemoryTaskStore {
    fn ensure_directories(&self) -> Result<()> {
        Ok(())
    }

    fn next_pending(&self) -> Result<Option<Task>> {
        if let Some(message) = self.pending_error.borrow_mut().take() {
            bail!(message);
        }
        Ok(self
            .tasks
            .borrow()
            .iter()
            .find(|(_, (state, _))| *state == TaskState::Pending)
            .map(|(name, _)| Task::new(name.clone(), TaskState::Pending)))
    }

    fn move_to(&self, task: &Task, target: TaskState) -> Result<Task> {
        if !task.state.can_transition_to(target) {
            bail!("invalid transition for {}: {} -> {}", task.name, task.state, target);
        }
        if self
            .blocked_moves
            .borrow()
            .iter()
            .any(|(name, state)| *name == task.name && *state == target)
        {
            bail!("task {} already exists in {}", task.name, target);
        }
        let mut tasks = self.tasks.borrow_mut();
        match tasks.get_mut(&task.name) {
            Some((state, _)) if *state == task.state => {
                *state = target;
                Ok(Task::new(task.name.clone(), target))
            }
            _ => bail!("task {} not found in {}", task.name, task.state),
        }
    }

    fn read(&self, task: &Task) -> Result<String> {
        match self.tasks.borrow().get(&task.name) {
            Some((state, content)) if *state == task.state => Ok(content.clone()),
            _ => bail!("task {} not found in {}", task.name, task.state),
        }
    }

    fn list(&self, state: TaskState) -> Result<Vec<String>> {
        Ok(self
            .tasks
            .borrow()
            .iter()
            .filter(|(_, (s, _))| *s == state)
            .map(|(name, _)| name.clone())
            .collect())
    }
}

/// Temporary on-disk queue for integration tests.
#[cfg(feature = "test-support")]
pub struct TestQueue {
    dir: tempfile::TempDir,
    store: DirTaskStore,
}

#[cfg(feature = "test-support")]
impl TestQueue {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let store = DirTaskStore::new(dir.path().join("ai_tasks"));
        store.ensure_directories()?;
        Ok(Self { dir, store })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> &DirTaskStore {
        &self.store
    }

    /// Drop a task file into `pending`.
    pub fn add_pending(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.store.state_dir(TaskState::Pending).join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Sorted task names per state, in lifecycle order.
    pub fn snapshot(&self) -> Result<Vec<(TaskState, Vec<String>)>> {
        TaskState::ALL
            .into_iter()
            .map(|state| Ok((state, self.store.list(state)?)))
            .collect()
    }
}

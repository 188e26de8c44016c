//! Task lifecycle: acquire, implement, build-and-fix, finalize.
//!
//! One call to [`Worker::run_iteration`] takes at most one task from
//! `pending` to a terminal state:
//!
//! ```text
//! pending -> in_progress -> implement -> build (-> fix -> build)* -> done | failed
//! ```
//!
//! Per-task errors (unreadable task, agent spawn failure, broken build command)
//! never escape once the task is acquired: the task is moved to `failed`
//! instead. A task that cannot be acquired is skipped for the rest of the
//! worker's life so it cannot block the tasks queued behind it.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, instrument, warn};

use crate::core::state::TaskState;
use crate::core::types::{AgentOutcome, FailureReason, IterationOutcome, Task};
use crate::io::agent::Agent;
use crate::io::build::BuildRunner;
use crate::io::config::WorkerConfig;
use crate::io::prompt::PromptEngine;
use crate::io::sleep::Sleeper;
use crate::io::task_store::TaskStore;

/// Terminal verdict for an acquired task, before it is moved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Done { attempts: u32 },
    Failed(FailureReason),
}

/// Drives tasks through the queue using the configured collaborators.
pub struct Worker<'a, S, A, B, Z> {
    config: &'a WorkerConfig,
    store: &'a S,
    agent: &'a A,
    build: &'a B,
    sleeper: &'a Z,
    prompts: PromptEngine,
    /// Pending names whose move to `in_progress` failed.
    skipped: RefCell<BTreeSet<String>>,
}

impl<'a, S, A, B, Z> Worker<'a, S, A, B, Z>
where
    S: TaskStore,
    A: Agent,
    B: BuildRunner,
    Z: Sleeper,
{
    pub fn new(
        config: &'a WorkerConfig,
        store: &'a S,
        agent: &'a A,
        build: &'a B,
        sleeper: &'a Z,
    ) -> Result<Self> {
        Ok(Self {
            config,
            store,
            agent,
            build,
            sleeper,
            prompts: PromptEngine::new(&config.prompt)?,
            skipped: RefCell::new(BTreeSet::new()),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        self.config
    }

    pub fn sleeper(&self) -> &Z {
        self.sleeper
    }

    /// Take the next pending task (if any) through its whole lifecycle.
    ///
    /// Returns `Idle` without sleeping when `pending` holds nothing that can be
    /// acquired. Errors are only returned when the queue itself misbehaves
    /// (listing `pending`, acquiring a task, or moving it to `failed`). A task
    /// whose acquisition failed is not offered again by this worker.
    pub fn run_iteration(&self) -> Result<IterationOutcome> {
        let Some(task) = self.next_candidate()? else {
            return Ok(IterationOutcome::Idle);
        };
        info!(task = %task.name, "new task");
        let task = match self.store.move_to(&task, TaskState::InProgress) {
            Ok(task) => task,
            Err(err) => {
                warn!(task = %task.name, "could not acquire task, skipping it from now on");
                self.skipped.borrow_mut().insert(task.name);
                return Err(err);
            }
        };
        self.process_task(&task)
    }

    /// Names of pending tasks this worker gave up acquiring.
    pub fn skipped(&self) -> Vec<String> {
        self.skipped.borrow().iter().cloned().collect()
    }

    fn next_candidate(&self) -> Result<Option<Task>> {
        let skipped = self.skipped.borrow();
        if skipped.is_empty() {
            return self.store.next_pending();
        }
        Ok(self
            .store
            .list(TaskState::Pending)?
            .into_iter()
            .find(|name| !skipped.contains(name))
            .map(|name| Task::new(name, TaskState::Pending)))
    }

    /// Implement, build and finalize a task that is already in `in_progress`.
    #[instrument(skip_all, fields(task = %task.name))]
    pub fn process_task(&self, task: &Task) -> Result<IterationOutcome> {
        let started = Instant::now();
        let verdict = self.implement_and_build(task).unwrap_or_else(|err| {
            error!(err = %format!("{err:#}"), "task processing error");
            Verdict::Failed(FailureReason::Error(format!("{err:#}")))
        });
        let elapsed_secs = started.elapsed().as_secs();

        match verdict {
            Verdict::Done { attempts } => match self.store.move_to(task, TaskState::Done) {
                Ok(_) => {
                    info!(attempts, elapsed_secs, "task completed");
                    Ok(IterationOutcome::Completed {
                        task: task.name.clone(),
                        attempts,
                    })
                }
                Err(err) => {
                    error!(err = %format!("{err:#}"), "could not move task to done");
                    let reason = FailureReason::Error(format!("move to done: {err:#}"));
                    self.finish_failed(task, reason, elapsed_secs)
                }
            },
            Verdict::Failed(reason) => self.finish_failed(task, reason, elapsed_secs),
        }
    }

    fn finish_failed(
        &self,
        task: &Task,
        reason: FailureReason,
        elapsed_secs: u64,
    ) -> Result<IterationOutcome> {
        self.store.move_to(task, TaskState::Failed)?;
        warn!(reason = %reason, elapsed_secs, "task failed");
        Ok(IterationOutcome::Failed {
            task: task.name.clone(),
            reason,
        })
    }

    fn implement_and_build(&self, task: &Task) -> Result<Verdict> {
        let content = self.store.read(task)?;
        let prompt = self.prompts.render_implement(&content)?;
        if !self.call_agent(&prompt, "implement") {
            return Ok(Verdict::Failed(FailureReason::ImplementationFailed));
        }

        let max_attempts = self.config.max_build_attempts;
        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, "build attempt");
            let result = self.build.run()?;
            if result.success() {
                return Ok(Verdict::Done { attempts: attempt });
            }
            warn!(attempt, exit_code = ?result.exit_code, "build failed, asking agent to fix");

            let prompt = self.prompts.render_fix(&result.output)?;
            if !self.call_agent(&prompt, "fix") {
                return Ok(Verdict::Failed(FailureReason::FixFailed { attempt }));
            }
            self.sleeper.sleep(self.config.schedule.fix_delay());
        }

        Ok(Verdict::Failed(FailureReason::AttemptsExhausted {
            attempts: max_attempts,
        }))
    }

    /// Run the agent; spawn errors count as a failed call.
    fn call_agent(&self, prompt: &str, phase: &str) -> bool {
        match self.agent.run(prompt) {
            Ok(AgentOutcome::Succeeded) => true,
            Ok(AgentOutcome::Failed { exit_code }) => {
                warn!(phase, ?exit_code, "agent failed");
                false
            }
            Err(err) => {
                error!(phase, err = %format!("{err:#}"), "agent invocation error");
                false
            }
        }
    }
}

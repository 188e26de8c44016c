//! The unbounded polling loop behind `ai-worker run`.

use std::ops::ControlFlow;

use anyhow::Error;
use tracing::{error, info};

use crate::core::types::IterationOutcome;
use crate::io::agent::Agent;
use crate::io::build::BuildRunner;
use crate::io::sleep::Sleeper;
use crate::io::task_store::TaskStore;
use crate::lifecycle::Worker;

/// What a loop iteration produced, handed to the `on_iteration` callback.
#[derive(Debug)]
pub enum LoopEvent<'a> {
    Iteration(&'a IterationOutcome),
    /// The queue itself failed (listing, acquiring or finalizing a task).
    Error(&'a Error),
}

/// Run worker iterations forever.
///
/// Sleeps `idle_poll_secs` after an idle iteration and `task_delay_secs` after
/// anything else, including an error. Errors are logged and never end the loop.
/// After each pause `on_iteration` is called; returning `ControlFlow::Break`
/// is the only way to stop.
pub fn run_loop<S, A, B, Z, F>(worker: &Worker<'_, S, A, B, Z>, mut on_iteration: F)
where
    S: TaskStore,
    A: Agent,
    B: BuildRunner,
    Z: Sleeper,
    F: FnMut(LoopEvent<'_>) -> ControlFlow<()>,
{
    let schedule = &worker.config().schedule;
    loop {
        let result = worker.run_iteration();
        match &result {
            Ok(IterationOutcome::Idle) => {
                info!(
                    idle_poll_secs = schedule.idle_poll_secs,
                    "no pending tasks, sleeping"
                );
                worker.sleeper().sleep(schedule.idle_poll());
            }
            Ok(_) => worker.sleeper().sleep(schedule.task_delay()),
            Err(err) => {
                error!(err = %format!("{err:#}"), "worker iteration failed");
                worker.sleeper().sleep(schedule.task_delay());
            }
        }

        let event = match &result {
            Ok(outcome) => LoopEvent::Iteration(outcome),
            Err(err) => LoopEvent::Error(err),
        };
        if on_iteration(event).is_break() {
            return;
        }
    }
}

//! Agent abstraction for prompt-driven code changes.
//!
//! The [`Agent`] trait decouples the worker lifecycle from the actual agent
//! backend (currently `codex exec`). Tests use scripted agents that record
//! prompts and return predetermined outcomes without spawning processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::truncate::tail_chars;
use crate::core::types::AgentOutcome;
use crate::io::config::WorkerConfig;
use crate::io::process::run_command;

/// Characters of agent output echoed to the log when the agent fails.
const FAILURE_LOG_TAIL_CHARS: usize = 2000;

/// Abstraction over agent backends.
///
/// The agent edits project files as a side effect; only its exit status is
/// reported back.
pub trait Agent {
    fn run(&self, prompt: &str) -> Result<AgentOutcome>;
}

/// Agent that spawns `codex exec` with the prompt on stdin.
#[derive(Debug, Clone)]
pub struct CodexAgent {
    pub program: String,
    pub sandbox: String,
    pub full_auto: bool,
    pub project_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl CodexAgent {
    pub fn from_config(cfg: &WorkerConfig) -> Self {
        Self {
            program: cfg.agent.program.clone(),
            sandbox: cfg.agent.sandbox.clone(),
            full_auto: cfg.agent.full_auto,
            project_dir: cfg.project_dir.clone(),
            timeout: cfg.agent.timeout_secs.map(Duration::from_secs),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("exec");
        if self.full_auto {
            cmd.arg("--full-auto");
        }
        cmd.arg("--sandbox")
            .arg(&self.sandbox)
            .arg("--cd")
            .arg(&self.project_dir);
        cmd
    }
}

impl Agent for CodexAgent {
    #[instrument(skip_all, fields(program = %self.program, prompt_chars = prompt.chars().count()))]
    fn run(&self, prompt: &str) -> Result<AgentOutcome> {
        info!(project_dir = %self.project_dir.display(), "starting agent");

        let output = run_command(
            self.command(),
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run {} exec", self.program))?;

        let text = output.combined_text();
        debug!(output = %text, "agent output");

        if output.timed_out {
            warn!(timeout = ?self.timeout, "agent timed out");
            return Ok(AgentOutcome::Failed { exit_code: None });
        }
        if !output.status.success() {
            warn!(
                exit_code = ?output.status.code(),
                output_tail = %tail_chars(&text, FAILURE_LOG_TAIL_CHARS),
                "agent execution failed"
            );
            return Ok(AgentOutcome::Failed {
                exit_code: output.status.code(),
            });
        }

        debug!("agent completed successfully");
        Ok(AgentOutcome::Succeeded)
    }
}

//! Build runner adapter for the project's build script.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::core::types::BuildResult;
use crate::io::config::WorkerConfig;
use crate::io::process::run_command;

/// Runs one build and reports its exit code and combined output.
pub trait BuildRunner {
    fn run(&self) -> Result<BuildResult>;
}

/// [`BuildRunner`] that executes a fixed command in the project directory.
#[derive(Debug, Clone)]
pub struct CommandBuildRunner {
    pub command: Vec<String>,
    pub project_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl CommandBuildRunner {
    pub fn from_config(cfg: &WorkerConfig) -> Self {
        Self {
            command: cfg.build.command.clone(),
            project_dir: cfg.project_dir.clone(),
            timeout: cfg.build.timeout_secs.map(Duration::from_secs),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }
}

impl BuildRunner for CommandBuildRunner {
    #[instrument(skip_all, fields(command = ?self.command))]
    fn run(&self) -> Result<BuildResult> {
        let Some((program, args)) = self.command.split_first() else {
            bail!("build command is empty");
        };
        info!(project_dir = %self.project_dir.display(), "running build");

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.project_dir);
        let output = run_command(cmd, None, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run build {program}"))?;

        let mut text = output.combined_text();
        if output.timed_out {
            let secs = self.timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
            text.push_str(&format!("\n[build timed out after {secs}s]\n"));
            return Ok(BuildResult {
                exit_code: None,
                output: text,
            });
        }

        debug!(exit_code = ?output.status.code(), output_bytes = text.len(), "build finished");
        Ok(BuildResult {
            exit_code: output.status.code(),
            output: text,
        })
    }
}

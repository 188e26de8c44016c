//! Prompt builder for agent input.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::debug;

use crate::core::truncate::{FIX_LOG_TAIL_CHARS, tail_chars};
use crate::io::config::PromptConfig;

const IMPLEMENT_TEMPLATE: &str = include_str!("prompts/implement.md");
const FIX_TEMPLATE: &str = include_str!("prompts/fix.md");

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
    project: String,
    manifest: String,
}

impl PromptEngine {
    pub fn new(cfg: &PromptConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("implement", IMPLEMENT_TEMPLATE)
            .context("load implement template")?;
        env.add_template("fix", FIX_TEMPLATE)
            .context("load fix template")?;
        Ok(Self {
            env,
            project: cfg.project.clone(),
            manifest: cfg.manifest.clone(),
        })
    }

    /// Prompt asking the agent to implement `task` (raw task file text).
    pub fn render_implement(&self, task: &str) -> Result<String> {
        let template = self.env.get_template("implement")?;
        let rendered = template
            .render(context! {
                project => self.project,
                manifest => self.manifest,
                task => task,
            })
            .context("render implement prompt")?;
        Ok(rendered)
    }

    /// Prompt asking the agent to fix a failed build.
    ///
    /// Only the last [`FIX_LOG_TAIL_CHARS`] characters of `build_output` are embedded.
    pub fn render_fix(&self, build_output: &str) -> Result<String> {
        let error_log = tail_chars(build_output, FIX_LOG_TAIL_CHARS);
        debug!(
            output_chars = build_output.chars().count(),
            kept_chars = error_log.chars().count(),
            "trimmed build output for fix prompt"
        );
        let template = self.env.get_template("fix")?;
        let rendered = template
            .render(context! {
                project => self.project,
                manifest => self.manifest,
                error_log => error_log,
            })
            .context("render fix prompt")?;
        Ok(rendered)
    }
}

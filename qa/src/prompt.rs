//! Analysis prompt for the release report.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const QA_ANALYSIS_TEMPLATE: &str = include_str!("prompts/qa_analysis.md");

/// Embed the checklist answers in the fixed analysis prompt.
pub fn render_analysis_prompt(qa_text: &str) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("qa_analysis", QA_ANALYSIS_TEMPLATE)
        .context("load qa analysis template")?;
    let rendered = env
        .get_template("qa_analysis")?
        .render(context! { qa_text => qa_text })
        .context("render qa analysis prompt")?;
    Ok(rendered)
}

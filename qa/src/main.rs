//! `qa-report`: turn a release checklist into a go/no-go report.
//!
//! Reads the checklist answers, asks the language model for a structured
//! readiness analysis, and saves the reply verbatim.

mod checklist;
mod model;
mod pipeline;
mod prompt;
mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use worker::logging;

use crate::model::{DEFAULT_BASE_URL, DEFAULT_MODEL, ModelConfig, OpenAiClient};
use crate::pipeline::generate_report;

#[derive(Parser)]
#[command(
    name = "qa-report",
    version,
    about = "Generate a release go/no-go report from a QA checklist"
)]
struct Cli {
    /// Checklist answers to analyze.
    #[arg(long, default_value = "release_qa.txt")]
    checklist: PathBuf,

    /// Where to write the report.
    #[arg(long, default_value = "qa_output/qa_decision.txt")]
    output: PathBuf,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API base URL. Defaults to `OPENAI_BASE_URL`, then the OpenAI endpoint.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,
}

fn main() {
    logging::init("info");
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let config = ModelConfig::new(api_key)
        .with_base_url(base_url)
        .with_model(cli.model)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = OpenAiClient::new(config)?;

    generate_report(&client, &cli.checklist, &cli.output)?;
    println!("QA decision saved → {}", cli.output.display());
    Ok(())
}

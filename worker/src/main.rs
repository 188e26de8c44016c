//! `ai-worker`: process development tasks from a folder queue, 24x7.
//!
//! Tasks are `.md` files in `<tasks_root>/pending`. Each one is implemented by
//! the coding agent, built, and repaired by the agent until the build passes
//! or the attempt budget runs out.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use worker::core::types::IterationOutcome;
use worker::exit_codes;
use worker::io::agent::CodexAgent;
use worker::io::build::CommandBuildRunner;
use worker::io::config::{DEFAULT_CONFIG_PATH, WorkerConfig, load_config};
use worker::io::init::{InitOptions, init_worker};
use worker::io::sleep::ThreadSleeper;
use worker::io::task_store::{DirTaskStore, TaskStore};
use worker::lifecycle::Worker;
use worker::logging;
use worker::looping::run_loop;
use worker::status::queue_status;

#[derive(Parser)]
#[command(
    name = "ai-worker",
    version,
    about = "Folder-queue worker that implements tasks with a coding agent"
)]
struct Cli {
    /// Path to the worker config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the queue forever, processing one task at a time.
    Run,
    /// Process at most one pending task and exit.
    Once,
    /// Create the queue directories and a default config file if missing.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// List tasks in each queue state.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init("info");
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run => cmd_run(&cli.config),
        Command::Once => cmd_once(&cli.config),
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::Status { json } => cmd_status(&cli.config, json),
    }
}

fn load(config_path: &Path) -> Result<(WorkerConfig, DirTaskStore)> {
    let cfg = load_config(config_path).context("load worker config")?;
    let store = DirTaskStore::new(&cfg.tasks_root);
    Ok((cfg, store))
}

fn cmd_run(config_path: &Path) -> Result<i32> {
    let (cfg, store) = load(config_path)?;
    store.ensure_directories()?;
    let agent = CodexAgent::from_config(&cfg);
    let build = CommandBuildRunner::from_config(&cfg);
    let worker = Worker::new(&cfg, &store, &agent, &build, &ThreadSleeper)?;

    info!(
        tasks_root = %cfg.tasks_root.display(),
        project_dir = %cfg.project_dir.display(),
        "worker started"
    );
    run_loop(&worker, |_| ControlFlow::Continue(()));
    Ok(exit_codes::OK)
}

fn cmd_once(config_path: &Path) -> Result<i32> {
    let (cfg, store) = load(config_path)?;
    store.ensure_directories()?;
    let agent = CodexAgent::from_config(&cfg);
    let build = CommandBuildRunner::from_config(&cfg);
    let worker = Worker::new(&cfg, &store, &agent, &build, &ThreadSleeper)?;

    let code = match worker.run_iteration()? {
        IterationOutcome::Idle => {
            println!("idle: no pending tasks");
            exit_codes::IDLE
        }
        IterationOutcome::Completed { task, attempts } => {
            println!("done: {task} (builds={attempts})");
            exit_codes::OK
        }
        IterationOutcome::Failed { task, reason } => {
            println!("failed: {task} ({reason})");
            exit_codes::TASK_FAILED
        }
    };
    Ok(code)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    let outcome = init_worker(config_path, &InitOptions { force })?;
    println!(
        "init: config={} written={} tasks_root={}",
        config_path.display(),
        outcome.config_written,
        outcome.tasks_root.display()
    );
    Ok(exit_codes::OK)
}

fn cmd_status(config_path: &Path, json: bool) -> Result<i32> {
    let (_cfg, store) = load(config_path)?;
    let status = queue_status(&store)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("serialize status")?
        );
    } else {
        print!("{}", status.render_text());
    }
    Ok(exit_codes::OK)
}

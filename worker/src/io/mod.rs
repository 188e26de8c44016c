//! I/O adapters for the worker: filesystem queue, subprocesses, prompts, config.

pub mod agent;
pub mod build;
pub mod config;
pub mod init;
pub mod process;
pub mod prompt;
pub mod sleep;
pub mod task_store;

//! Folder-queue worker that hands development tasks to a coding agent.
//!
//! Tasks are `.md` files dropped into `pending/`. The worker takes them one at
//! a time, asks the agent to implement each, then runs the project build and
//! feeds failures back to the agent for a bounded number of attempts. Each
//! task ends in `done/` or `failed/`.
//!
//! - **[`core`]**: Pure, deterministic logic (task states, truncation, outcomes).
//! - **[`io`]**: Side-effecting adapters (task directories, subprocesses,
//!   prompt templates, config). Each sits behind a trait so tests can swap it.
//!
//! [`lifecycle`] and [`looping`] coordinate the two into the worker itself.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod lifecycle;
pub mod logging;
pub mod looping;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

//! Stable exit codes for `ai-worker` commands.

/// Command succeeded, or `once` moved its task to `done`.
pub const OK: i32 = 0;
/// Invalid config, I/O failure or other error.
pub const INVALID: i32 = 1;
/// `ai-worker once` found no pending task.
pub const IDLE: i32 = 2;
/// `ai-worker once` moved its task to `failed`.
pub const TASK_FAILED: i32 = 3;

//! Initialization helpers for the task queue and config file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::config::{WorkerConfig, load_config, write_config};
use super::task_store::{DirTaskStore, TaskStore};

/// Options for `init_worker`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing config file with defaults.
    pub force: bool,
}

/// What `init_worker` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_written: bool,
    pub tasks_root: PathBuf,
}

/// Write the default config (unless present and not forced) and create the queue directories
/// named by the resulting config.
pub fn init_worker(config_path: &Path, options: &InitOptions) -> Result<InitOutcome> {
    let (cfg, config_written) = if options.force || !config_path.exists() {
        let cfg = WorkerConfig::default();
        write_config(config_path, &cfg)
            .with_context(|| format!("write {}", config_path.display()))?;
        (cfg, true)
    } else {
        (load_config(config_path)?, false)
    };

    let store = DirTaskStore::new(&cfg.tasks_root);
    store.ensure_directories().context("create task directories")?;

    info!(
        config = %config_path.display(),
        config_written,
        tasks_root = %cfg.tasks_root.display(),
        "worker initialized"
    );
    Ok(InitOutcome {
        config_written,
        tasks_root: cfg.tasks_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::TaskState;
    use std::fs;

    #[test]
    fn init_keeps_existing_config_unless_forced() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config_path = temp.path().join("ai_worker.toml");
        let tasks_root = temp.path().join("queue");
        fs::write(
            &config_path,
            format!("tasks_root = {:?}\n", tasks_root.display().to_string()),
        )
        .expect("write config");

        let outcome = init_worker(&config_path, &InitOptions { force: false }).expect("init");
        assert!(!outcome.config_written);
        assert_eq!(outcome.tasks_root, tasks_root);
        for state in TaskState::ALL {
            assert!(tasks_root.join(state.dir_name()).is_dir());
        }
        let contents = fs::read_to_string(&config_path).expect("read");
        assert!(contents.contains("queue"));
    }
}

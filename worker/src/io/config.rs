//! Worker configuration stored in `ai_worker.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ai_worker.toml";

/// Worker configuration (TOML).
///
/// Loaded once at startup and never mutated afterwards. Missing fields fall
/// back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Project working directory handed to the agent and the build.
    pub project_dir: PathBuf,

    /// Root of the task queue (`pending/`, `in_progress/`, `done/`, `failed/`).
    pub tasks_root: PathBuf,

    /// Build cycles per task before it is moved to `failed`.
    pub max_build_attempts: u32,

    /// Keep at most this many bytes of each captured stdout/stderr stream.
    pub output_limit_bytes: usize,

    pub schedule: ScheduleConfig,
    pub agent: AgentConfig,
    pub build: BuildConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Sleep when the pending queue is empty.
    pub idle_poll_secs: u64,
    /// Pause between a fix and the next build attempt.
    pub fix_delay_secs: u64,
    /// Pause after each processed task.
    pub task_delay_secs: u64,
}

impl ScheduleConfig {
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs)
    }

    pub fn fix_delay(&self) -> Duration {
        Duration::from_secs(self.fix_delay_secs)
    }

    pub fn task_delay(&self) -> Duration {
        Duration::from_secs(self.task_delay_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            idle_poll_secs: 5 * 60,
            fix_delay_secs: 2,
            task_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent executable (`codex exec` compatible).
    pub program: String,
    /// Value for `--sandbox`.
    pub sandbox: String,
    /// Pass `--full-auto`.
    pub full_auto: bool,
    /// Kill the agent after this long. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: "codex".to_string(),
            sandbox: "workspace-write".to_string(),
            full_auto: true,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Build command, run in `project_dir`.
    pub command: Vec<String>,
    /// Kill the build after this long. Unset means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: ["powershell", "-ExecutionPolicy", "Bypass", "-File", "smart_run.ps1"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            timeout_secs: None,
        }
    }
}

/// Project wording embedded in both prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PromptConfig {
    pub project: String,
    pub manifest: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            project: "Android Kotlin project".to_string(),
            manifest: "build.gradle".to_string(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            tasks_root: PathBuf::from("ai_tasks"),
            max_build_attempts: 5,
            output_limit_bytes: 1_000_000,
            schedule: ScheduleConfig::default(),
            agent: AgentConfig::default(),
            build: BuildConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_build_attempts == 0 {
            return Err(anyhow!("max_build_attempts must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.agent.program.trim().is_empty() {
            return Err(anyhow!("agent.program must be non-empty"));
        }
        if self.build.command.is_empty() || self.build.command[0].trim().is_empty() {
            return Err(anyhow!("build.command must be a non-empty array"));
        }
        if self.agent.timeout_secs == Some(0) || self.build.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0 when set"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `WorkerConfig::default()`.
pub fn load_config(path: &Path) -> Result<WorkerConfig> {
    if !path.exists() {
        let cfg = WorkerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: WorkerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &WorkerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, WorkerConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ai_worker.toml");
        let cfg = WorkerConfig {
            max_build_attempts: 3,
            agent: AgentConfig {
                timeout_secs: Some(600),
                ..AgentConfig::default()
            },
            ..WorkerConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ai_worker.toml");
        fs::write(
            &path,
            "tasks_root = \"queue\"\n\n[build]\ncommand = [\"./gradlew\", \"assembleDebug\"]\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.tasks_root, PathBuf::from("queue"));
        assert_eq!(cfg.build.command, vec!["./gradlew", "assembleDebug"]);
        assert_eq!(cfg.max_build_attempts, 5);
        assert_eq!(cfg.schedule, ScheduleConfig::default());
    }

    #[test]
    fn rejects_zero_attempts() {
        let cfg = WorkerConfig {
            max_build_attempts: 0,
            ..WorkerConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_build_attempts"));
    }

    #[test]
    fn rejects_empty_build_command() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ai_worker.toml");
        fs::write(&path, "[build]\ncommand = []\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("build.command"));
    }

    #[test]
    fn default_schedule_matches_polling_intervals() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.idle_poll(), Duration::from_secs(300));
        assert_eq!(schedule.fix_delay(), Duration::from_secs(2));
        assert_eq!(schedule.task_delay(), Duration::from_secs(5));
    }
}

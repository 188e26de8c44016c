//! Report output.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Write the report text verbatim, creating the parent directory if needed.
///
/// Written to a temp file first and renamed into place.
pub fn save_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report dir {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, report)
        .with_context(|| format!("write temp report {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace report {}", path.display()))?;
    debug!(path = %path.display(), bytes = report.len(), "report written");
    Ok(())
}

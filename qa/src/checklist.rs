//! Release checklist input.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Text analyzed in place of a checklist that does not exist.
pub const MISSING_CHECKLIST: &str = "Q&A file missing.";

/// Read the checklist, or return [`MISSING_CHECKLIST`] if the file is absent.
///
/// Any other read failure (permissions, invalid UTF-8) is an error.
pub fn read_checklist(path: &Path) -> Result<String> {
    if !path.exists() {
        warn!(path = %path.display(), "checklist missing, analyzing placeholder");
        return Ok(MISSING_CHECKLIST.to_string());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("read checklist {}", path.display()))?;
    debug!(path = %path.display(), chars = text.chars().count(), "checklist loaded");
    Ok(text)
}

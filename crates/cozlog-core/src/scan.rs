//! Log directory discovery.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::LogError;

/// A log file and the time it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

/// Lists the regular files in `dir`, oldest first.
///
/// Files sharing a modification time are ordered by path so the result is
/// deterministic. Sub-directories are skipped.
pub fn scan_log_dir(dir: &Path) -> Result<Vec<LogFile>, LogError> {
    if !dir.exists() {
        return Err(LogError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(LogError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| LogError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LogError::io(dir, e))?;
        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| LogError::io(&path, e))?;
        if !metadata.is_file() {
            tracing::trace!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        let modified = metadata.modified().map_err(|e| LogError::io(&path, e))?;
        files.push(LogFile {
            path,
            modified: DateTime::<Utc>::from(modified),
        });
    }

    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    tracing::debug!(dir = %dir.display(), count = files.len(), "scanned log directory");
    Ok(files)
}

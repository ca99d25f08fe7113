use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating or reading log files.
///
/// Malformed JSON inside a log file is not an error: those fragments are
/// dropped individually and counted in [`crate::ParsedLog::error_lines`].
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("log directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl LogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

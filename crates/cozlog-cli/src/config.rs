//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log directory used when none is given on the command line.
    pub log_dir: PathBuf,

    /// Minutes of inactivity that start a new play session.
    pub session_gap_minutes: u32,

    /// Abort on the first unreadable log file.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        let documents = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_dir: documents.join("CozmoLogs"),
            session_gap_minutes: 15,
            strict: false,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // COZLOG_LOG_DIR, COZLOG_SESSION_GAP_MINUTES, COZLOG_STRICT
        figment = figment.merge(Env::prefixed("COZLOG_"));

        figment.extract()
    }

    pub fn session_gap(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.session_gap_minutes))
    }
}

/// Returns the platform-specific config directory for cozlog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cozlog"))
}

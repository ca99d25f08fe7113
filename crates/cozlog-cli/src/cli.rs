//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Robot usage log analyser.
///
/// Reads the robot's event logs, groups them into days and play sessions,
/// and reports games, animations, faces and goals seen in each session.
#[derive(Debug, Parser)]
#[command(name = "cozlog", version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the log files (defaults to the configured `log_dir`).
    pub log_dir: Option<PathBuf>,

    /// Print the usage log as JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Abort on the first unreadable log file instead of skipping it.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_log_dir() {
        let cli = Cli::try_parse_from(["cozlog", "/tmp/logs", "--json"]).unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert!(cli.json);
        assert!(!cli.strict);
    }

    #[test]
    fn test_log_dir_is_optional() {
        let cli = Cli::try_parse_from(["cozlog", "-v"]).unwrap();
        assert!(cli.log_dir.is_none());
        assert!(cli.verbose);
    }
}

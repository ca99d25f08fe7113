//! Grouping of log files into calendar days and interaction sessions.
//!
//! A log file's modification time stands in for the time it was written.
//! Files are visited oldest first: the first file of a date opens a new day,
//! and within a day an inactivity gap of at least `session_gap` opens a new
//! session. Shorter gaps are credited to the current session's play time.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::Serialize;

use crate::day::DailyData;
use crate::error::LogError;
use crate::repair::read_log_file;
use crate::scan::LogFile;
use crate::session::SessionData;
use crate::tracker::analyse_records;

/// Default inactivity gap that separates two sessions.
pub const DEFAULT_SESSION_GAP: TimeDelta = TimeDelta::minutes(15);

/// Options controlling how a run of log files is ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Inactivity gap that opens a new session.
    pub session_gap: TimeDelta,
    /// Abort on the first unreadable file instead of skipping it.
    pub strict: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            session_gap: DEFAULT_SESSION_GAP,
            strict: false,
        }
    }
}

/// Aggregated usage for a whole run, keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageLog {
    pub days: BTreeMap<NaiveDate, DailyData>,
    /// Files that could not be read and were left out.
    pub skipped_files: Vec<PathBuf>,
    /// Log lines dropped because they could not be repaired.
    pub error_lines: usize,
    pub files_read: usize,
}

impl UsageLog {
    pub fn session_count(&self) -> usize {
        self.days.values().map(|day| day.sessions().len()).sum()
    }
}

/// Assigns log timestamps to days and sessions.
#[derive(Debug)]
pub struct Segmenter {
    log: UsageLog,
    last_log_time: Option<DateTime<Utc>>,
    session_gap: TimeDelta,
}

impl Segmenter {
    pub fn new(session_gap: TimeDelta) -> Self {
        Self {
            log: UsageLog::default(),
            last_log_time: None,
            session_gap,
        }
    }

    /// Returns the session a log written at `log_time` belongs to, opening a
    /// new day or session when needed.
    ///
    /// Timestamps must be fed in ascending order.
    pub fn session_for(&mut self, log_time: DateTime<Utc>) -> &mut SessionData {
        let previous = self.last_log_time.replace(log_time);
        let session_gap = self.session_gap;

        match self.log.days.entry(log_time.date_naive()) {
            Entry::Vacant(entry) => {
                tracing::debug!(date = %entry.key(), "new day");
                entry.insert(DailyData::new(log_time)).current_session_mut()
            }
            Entry::Occupied(entry) => {
                let day = entry.into_mut();
                let gap = previous.map_or(TimeDelta::zero(), |previous| log_time - previous);
                if gap >= session_gap {
                    tracing::debug!(
                        date = %day.date,
                        gap_secs = gap.num_seconds(),
                        "inactivity gap, new session"
                    );
                    day.new_session(log_time)
                } else {
                    let session = day.current_session_mut();
                    session.add_time(Some(gap));
                    session
                }
            }
        }
    }

    pub fn finish(self) -> UsageLog {
        self.log
    }
}

/// Reads and aggregates log files, which must be sorted oldest first.
///
/// An unreadable file still counts towards session segmentation. Unless
/// `options.strict` is set it is then skipped and listed in
/// [`UsageLog::skipped_files`].
pub fn build_usage_log(files: &[LogFile], options: &IngestOptions) -> Result<UsageLog, LogError> {
    let mut segmenter = Segmenter::new(options.session_gap);
    let mut skipped_files = Vec::new();
    let mut error_lines = 0;
    let mut files_read = 0;

    for file in files {
        let parsed = match read_log_file(&file.path) {
            Ok(parsed) => Some(parsed),
            Err(e) if !options.strict => {
                tracing::warn!(error = %e, "skipping unreadable log file");
                skipped_files.push(file.path.clone());
                None
            }
            Err(e) => return Err(e),
        };

        let session = segmenter.session_for(file.modified);
        if let Some(parsed) = parsed {
            tracing::debug!(
                path = %file.path.display(),
                session = session.session_id,
                records = parsed.records.len(),
                "analysing log file"
            );
            analyse_records(&parsed.records, session);
            error_lines += parsed.error_lines;
            files_read += 1;
        }
    }

    let mut log = segmenter.finish();
    log.skipped_files = skipped_files;
    log.error_lines = error_lines;
    log.files_read = files_read;
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::STANDARD_SESSION_START;
    use chrono::TimeZone;
    use std::fs;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, 0).unwrap()
    }

    fn segmenter() -> Segmenter {
        Segmenter::new(DEFAULT_SESSION_GAP)
    }

    #[test]
    fn first_file_opens_day_and_session() {
        let mut seg = segmenter();
        let session = seg.session_for(at(10, 0));
        assert_eq!(session.session_id, 0);
        assert_eq!(session.play_time(), STANDARD_SESSION_START);
        assert_eq!(session.start_time, at(9, 58));
        assert_eq!(seg.finish().days.len(), 1);
    }

    #[test]
    fn ten_minute_gap_extends_session() {
        let mut seg = segmenter();
        seg.session_for(at(10, 0));
        let session = seg.session_for(at(10, 10));

        assert_eq!(session.session_id, 0);
        assert_eq!(
            session.play_time(),
            STANDARD_SESSION_START + TimeDelta::minutes(10)
        );
    }

    #[test]
    fn sixteen_minute_gap_opens_new_session() {
        let mut seg = segmenter();
        seg.session_for(at(10, 0));
        let session = seg.session_for(at(10, 16));

        assert_eq!(session.session_id, 1);
        assert_eq!(session.play_time(), STANDARD_SESSION_START);
        assert_eq!(session.start_time, at(10, 14));

        let log = seg.finish();
        let day = &log.days[&at(10, 0).date_naive()];
        assert_eq!(day.sessions().len(), 2);
        assert_eq!(day.sessions()[0].play_time(), STANDARD_SESSION_START);
    }

    #[test]
    fn exactly_fifteen_minutes_is_a_new_session() {
        let mut seg = segmenter();
        seg.session_for(at(10, 0));
        assert_eq!(seg.session_for(at(10, 15)).session_id, 1);
    }

    #[test]
    fn gaps_are_measured_from_previous_file() {
        let mut seg = segmenter();
        seg.session_for(at(10, 0));
        seg.session_for(at(10, 10));
        let session = seg.session_for(at(10, 20));
        assert_eq!(session.session_id, 0);
        assert_eq!(
            session.play_time(),
            STANDARD_SESSION_START + TimeDelta::minutes(20)
        );
    }

    #[test]
    fn new_date_opens_new_day_even_after_short_gap() {
        let mut seg = segmenter();
        seg.session_for(Utc.with_ymd_and_hms(2024, 3, 9, 23, 55, 0).unwrap());
        let session = seg.session_for(Utc.with_ymd_and_hms(2024, 3, 10, 0, 2, 0).unwrap());
        assert_eq!(session.session_id, 0);

        let log = seg.finish();
        assert_eq!(log.days.len(), 2);
        assert_eq!(log.session_count(), 2);
    }

    #[test]
    fn custom_gap_is_honoured() {
        let mut seg = Segmenter::new(TimeDelta::minutes(5));
        seg.session_for(at(10, 0));
        assert_eq!(seg.session_for(at(10, 6)).session_id, 1);
    }

    fn log_file(dir: &std::path::Path, name: &str, content: &str, modified: DateTime<Utc>) -> LogFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        LogFile { path, modified }
    }

    #[test]
    fn game_spans_files_within_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            log_file(dir.path(), "1.log", r#"{"game.launch":"maze"},"#, at(10, 0)),
            log_file(dir.path(), "2.log", r#"{"game.end":""},{"oops"},"#, at(10, 5)),
        ];

        let log = build_usage_log(&files, &IngestOptions::default()).unwrap();
        let day = &log.days[&at(10, 0).date_naive()];
        assert_eq!(day.sessions().len(), 1);
        assert_eq!(day.sessions()[0].game_record["maze"].neutral_count, 1);
        assert_eq!(log.error_lines, 1);
        assert_eq!(log.files_read, 2);
    }

    #[test]
    fn game_state_does_not_cross_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            log_file(dir.path(), "1.log", r#"{"game.launch":"maze"},"#, at(10, 0)),
            log_file(dir.path(), "2.log", r#"{"game.end":""},"#, at(11, 0)),
        ];

        let log = build_usage_log(&files, &IngestOptions::default()).unwrap();
        let sessions = log.days[&at(10, 0).date_naive()].sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].game_record["maze"].neutral_count, 0);
        assert!(sessions[1].game_record.is_empty());
    }

    #[test]
    fn unreadable_file_is_skipped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            LogFile {
                path: dir.path().join("missing.log"),
                modified: at(10, 0),
            },
            log_file(dir.path(), "2.log", r#"{"game.launch":"maze"},"#, at(10, 5)),
        ];

        let log = build_usage_log(&files, &IngestOptions::default()).unwrap();
        assert_eq!(log.skipped_files, vec![dir.path().join("missing.log")]);
        assert_eq!(log.files_read, 1);
        let session = &log.days[&at(10, 0).date_naive()].sessions()[0];
        assert!(session.game_record.contains_key("maze"));
        assert_eq!(
            session.play_time(),
            STANDARD_SESSION_START + TimeDelta::minutes(5)
        );
    }

    #[test]
    fn unreadable_file_aborts_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![LogFile {
            path: dir.path().join("missing.log"),
            modified: at(10, 0),
        }];
        let options = IngestOptions {
            strict: true,
            ..IngestOptions::default()
        };

        let err = build_usage_log(&files, &options).unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
    }
}

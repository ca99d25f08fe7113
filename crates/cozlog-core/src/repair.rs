//! Lenient parsing of concatenated JSON log files.
//!
//! The robot writes its logs as JSON objects glued together with `},{` and
//! files are frequently cut off mid-object. Each object is repaired and parsed
//! on its own so a broken entry costs only that entry.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::LogError;
use crate::event::EventRecord;

/// Separator between consecutive objects in a log file.
const SEPARATOR: &str = "},{";

/// The parsed contents of one log file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    /// One entry per fragment, in file order. `None` marks a fragment that
    /// could not be parsed even after repair.
    pub records: Vec<Option<EventRecord>>,
    /// Number of `None` entries in `records`.
    pub error_lines: usize,
}

impl ParsedLog {
    /// Iterates over the successfully parsed records.
    pub fn valid_records(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().flatten()
    }
}

/// Restores the braces a fragment lost when the file was split on `},{`.
///
/// - A missing leading `{` is always restored.
/// - A non-final fragment gets a closing `}` unless it already ends with one.
/// - The final fragment keeps its own closing brace; a trailing comma left by
///   the writer is stripped instead.
///
/// Surrounding whitespace is ignored. A fragment that is already a complete
/// object is returned unchanged.
///
/// Values are expected to be flat. A non-final fragment whose last value is a
/// nested object already ends with `}`, so the brace taken by the separator is
/// not restored and the fragment fails to parse.
pub fn repair_fragment(fragment: &str, is_last: bool) -> Cow<'_, str> {
    let trimmed = fragment.trim();
    let body = if is_last {
        trimmed.strip_suffix(',').unwrap_or(trimmed).trim_end()
    } else {
        trimmed
    };

    let needs_open = !body.starts_with('{');
    let needs_close = !is_last && !body.ends_with('}');

    if !needs_open && !needs_close {
        return Cow::Borrowed(body);
    }

    let mut repaired = String::with_capacity(body.len() + 2);
    if needs_open {
        repaired.push('{');
    }
    repaired.push_str(body);
    if needs_close {
        repaired.push('}');
    }
    Cow::Owned(repaired)
}

/// Splits, repairs and parses the contents of a log file.
///
/// Blank content yields an empty log. Otherwise the result has exactly one
/// entry per `},{`-separated fragment.
pub fn parse_log(content: &str) -> ParsedLog {
    if content.trim().is_empty() {
        return ParsedLog::default();
    }

    let fragments: Vec<&str> = content.split(SEPARATOR).collect();
    let last = fragments.len() - 1;
    let mut parsed = ParsedLog {
        records: Vec::with_capacity(fragments.len()),
        error_lines: 0,
    };

    for (index, fragment) in fragments.into_iter().enumerate() {
        let repaired = repair_fragment(fragment, index == last);
        match serde_json::from_str::<EventRecord>(&repaired) {
            Ok(record) => parsed.records.push(Some(record)),
            Err(e) => {
                tracing::trace!(index, error = %e, "dropping unparseable log line");
                parsed.records.push(None);
                parsed.error_lines += 1;
            }
        }
    }

    parsed
}

/// Reads a whole log file and parses it with [`parse_log`].
pub fn read_log_file(path: &Path) -> Result<ParsedLog, LogError> {
    let content = fs::read_to_string(path).map_err(|e| LogError::io(path, e))?;
    let parsed = parse_log(&content);
    if parsed.error_lines > 0 {
        tracing::debug!(
            path = %path.display(),
            error_lines = parsed.error_lines,
            "log file contained unparseable lines"
        );
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKey;

    #[test]
    fn repair_restores_both_braces_on_inner_fragment() {
        assert_eq!(repair_fragment(r#""a":"1""#, false), r#"{"a":"1"}"#);
    }

    #[test]
    fn repair_leaves_well_formed_fragment_alone() {
        let fragment = r#"{"a":"1"}"#;
        assert!(matches!(repair_fragment(fragment, false), Cow::Borrowed(_)));
        assert_eq!(repair_fragment(fragment, false), fragment);
        assert_eq!(repair_fragment(fragment, true), fragment);
    }

    #[test]
    fn repair_adds_only_the_missing_brace() {
        assert_eq!(repair_fragment(r#"{"a":"1""#, false), r#"{"a":"1"}"#);
        assert_eq!(repair_fragment(r#""a":"1"}"#, false), r#"{"a":"1"}"#);
    }

    #[test]
    fn repair_strips_trailing_comma_on_last_fragment() {
        assert_eq!(repair_fragment("\"a\":\"1\"},\n", true), r#"{"a":"1"}"#);
    }

    #[test]
    fn repair_does_not_close_last_fragment() {
        // A truncated final object stays truncated and fails to parse later.
        assert_eq!(repair_fragment(r#""a":"1"#, true), r#"{"a":"1"#);
    }

    #[test]
    fn repair_empty_fragment() {
        assert_eq!(repair_fragment("", false), "{}");
        assert_eq!(repair_fragment("", true), "{");
    }

    #[test]
    fn parse_preserves_count_and_order() {
        let content = r#"{"game.launch":"maze"},{"game.start":"id1"},{"game.end":""},"#;
        let parsed = parse_log(content);

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.error_lines, 0);
        let first = parsed.records[0].as_ref().unwrap();
        assert_eq!(first.text(EventKey::GameLaunch).as_deref(), Some("maze"));
        let second = parsed.records[1].as_ref().unwrap();
        assert_eq!(second.text(EventKey::GameStart).as_deref(), Some("id1"));
        assert!(parsed.records[2].as_ref().unwrap().contains(EventKey::GameEnd));
    }

    #[test]
    fn malformed_fragment_becomes_none() {
        let content = r#"{"a":"1"},{"b":},{"c":"3"}"#;
        let parsed = parse_log(content);

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.error_lines, 1);
        assert!(parsed.records[0].is_some());
        assert!(parsed.records[1].is_none());
        assert!(parsed.records[2].is_some());
        assert_eq!(parsed.valid_records().count(), 2);
    }

    #[test]
    fn truncated_head_and_tail() {
        // File starts mid-object and ends mid-object.
        let content = r#""x":"lost"},{"a":"1"},{"b":"#;
        let parsed = parse_log(content);

        assert_eq!(parsed.records.len(), 3);
        assert!(parsed.records[0].is_some());
        assert!(parsed.records[1].is_some());
        assert!(parsed.records[2].is_none());
        assert_eq!(parsed.error_lines, 1);
    }

    #[test]
    fn nested_object_before_separator_is_dropped() {
        let parsed = parse_log(r#"{"a":{"x":"y"}},{"b":"2"},"#);

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.error_lines, 1);
        assert!(parsed.records[0].is_none());
        assert!(parsed.records[1].is_some());
    }

    #[test]
    fn blank_content_is_empty() {
        assert_eq!(parse_log(""), ParsedLog::default());
        assert_eq!(parse_log("  \n"), ParsedLog::default());
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_log_file(&dir.path().join("nope.log")).unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
    }

    #[test]
    fn read_file_parses_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        fs::write(&path, r#"{"game.launch":"maze"},{"game.end":""},"#).unwrap();

        let parsed = read_log_file(&path).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.error_lines, 0);
    }
}

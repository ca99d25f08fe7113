//! Usage report rendering.
//!
//! Prints one block per day (sorted by date) with one sub-block per session in
//! the order the sessions were opened, either as text or as JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use cozlog_core::{
    DailyData, GameDetails, IngestOptions, SentimentCounts, SessionData, UsageLog,
    build_usage_log, scan_log_dir,
};

/// Scans `log_dir`, aggregates every log file and prints the report.
pub fn run(log_dir: &Path, options: &IngestOptions, json: bool) -> Result<()> {
    let files = scan_log_dir(log_dir)
        .with_context(|| format!("incorrect log directory: {}", log_dir.display()))?;
    let usage = build_usage_log(&files, options).context("failed to read log files")?;

    if json {
        println!("{}", format_report_json(&usage)?);
    } else {
        print!("{}", format_report(&usage));
    }
    Ok(())
}

/// Formats the report as pretty-printed JSON.
pub fn format_report_json(usage: &UsageLog) -> Result<String> {
    serde_json::to_string_pretty(usage).context("failed to serialize usage log")
}

// ========== Value Formatting ==========

/// Formats milliseconds as `H:MM:SS`. Negative durations are shown as zero.
pub fn format_play_time(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

fn format_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined = items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "(none)".to_string()
    } else {
        joined
    }
}

/// Formats a list with duplicates removed, sorted.
fn format_distinct(items: &[String]) -> String {
    format_list(items.iter().collect::<BTreeSet<_>>())
}

fn format_counts(counts: &BTreeMap<String, u32>) -> String {
    if counts.is_empty() {
        return "(none)".to_string();
    }
    counts
        .iter()
        .map(|(name, count)| format!("{name} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_sentiment(counts: SentimentCounts) -> String {
    format!(
        "positive {}, negative {}, neutral {}",
        counts.positive, counts.negative, counts.neutral
    )
}

// ========== Report Sections ==========

fn write_game(output: &mut String, game: &GameDetails) {
    writeln!(output, "    {}", game.name).unwrap();
    writeln!(
        output,
        "      Starts: {}  Wins: {}  Losses: {}  Neutral: {}  Aborts: {}",
        game.start_count, game.win_count, game.lose_count, game.neutral_count, game.abort_count
    )
    .unwrap();
    writeln!(output, "      Animations: {}", format_sentiment(game.animations)).unwrap();
    for (name, count) in &game.animation_counts {
        writeln!(output, "        {name}  {count}").unwrap();
    }
}

fn write_session(output: &mut String, session: &SessionData) {
    writeln!(
        output,
        "SESSION {}  started {}  played {}",
        session.play_sessions,
        session.start_time.format("%H:%M:%S"),
        format_play_time(session.play_time_ms)
    )
    .unwrap();
    writeln!(output, "──────────").unwrap();
    writeln!(output, "Faces enrolled:     {}", format_list(&session.face_enrolled)).unwrap();
    writeln!(
        output,
        "Faces recognized:   {}",
        format_distinct(&session.face_recognized)
    )
    .unwrap();
    writeln!(output, "Pets:               {}", format_counts(&session.pets_recorded)).unwrap();
    writeln!(
        output,
        "Games unlocked:     {}",
        format_distinct(&session.games_unlocked)
    )
    .unwrap();
    writeln!(
        output,
        "Features unlocked:  {}",
        format_distinct(&session.features_unlocked)
    )
    .unwrap();
    writeln!(output, "Daily challenges:   {}", format_list(&session.daily_challenge)).unwrap();
    writeln!(
        output,
        "Goal progress:      {}",
        format_distinct(&session.goal_progress)
    )
    .unwrap();
    writeln!(output, "Robot requests:     {}", format_counts(&session.robot_requests)).unwrap();

    writeln!(output).unwrap();
    writeln!(output, "  Games:").unwrap();
    if session.game_record.is_empty() {
        writeln!(output, "    (none)").unwrap();
    }
    for game in session.game_record.values() {
        write_game(output, game);
    }

    writeln!(output, "  Freeplay:").unwrap();
    if session.freeplay_record.is_empty() {
        writeln!(output, "    (none)").unwrap();
    }
    for free_play in session.freeplay_record.values() {
        writeln!(output, "    {}  {}", free_play.name, free_play.start_count).unwrap();
    }

    writeln!(
        output,
        "  Animations: {}",
        format_sentiment(session.animations)
    )
    .unwrap();
    for (name, count) in &session.animations_played {
        writeln!(output, "    {name}  {count}").unwrap();
    }
}

fn write_day(output: &mut String, day: &DailyData) {
    let sessions = day.sessions();
    let noun = if sessions.len() == 1 { "session" } else { "sessions" };
    let header = format!("DAY {} ({} {noun})", day.date, sessions.len());
    writeln!(output, "{header}").unwrap();
    writeln!(output, "{}", "═".repeat(header.chars().count())).unwrap();
    for session in sessions {
        writeln!(output).unwrap();
        write_session(output, session);
    }
}

/// Formats the human-readable report.
pub fn format_report(usage: &UsageLog) -> String {
    let mut output = String::new();

    if usage.days.is_empty() {
        writeln!(output, "No robot activity found.").unwrap();
    }
    for day in usage.days.values() {
        write_day(&mut output, day);
        writeln!(output).unwrap();
    }

    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Days:              {}", usage.days.len()).unwrap();
    writeln!(output, "Sessions:          {}", usage.session_count()).unwrap();
    writeln!(output, "Files read:        {}", usage.files_read).unwrap();
    if !usage.skipped_files.is_empty() {
        writeln!(output, "Skipped files:     {}", usage.skipped_files.len()).unwrap();
    }
    if usage.error_lines > 0 {
        writeln!(output, "Unreadable lines:  {}", usage.error_lines).unwrap();
    }

    output
}

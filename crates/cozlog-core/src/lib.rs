//! Core domain logic for robot usage log analysis.
//!
//! This crate contains the fundamental types and logic for:
//! - Log repair: splitting concatenated JSON objects and parsing them leniently
//! - Event decoding: turning heterogeneous records into typed events
//! - Animation sentiment classification
//! - Game lifecycle tracking and per-session aggregation
//! - Day/session segmentation from log file timestamps

mod classify;
mod day;
mod error;
pub mod event;
mod repair;
pub mod scan;
mod segment;
pub mod session;
mod tracker;

pub use classify::{Sentiment, classify};
pub use day::DailyData;
pub use error::LogError;
pub use event::{Event, EventKey, EventRecord, UnknownEventKey};
pub use repair::{ParsedLog, parse_log, read_log_file, repair_fragment};
pub use scan::{LogFile, scan_log_dir};
pub use segment::{DEFAULT_SESSION_GAP, IngestOptions, Segmenter, UsageLog, build_usage_log};
pub use session::{
    FreeplayDetails, GameDetails, GameResult, GameState, RecordKey, STANDARD_SESSION_START,
    SentimentCounts, SessionData,
};
pub use tracker::{analyse_records, apply_event};

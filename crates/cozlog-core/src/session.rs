//! Per-session usage aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{Sentiment, classify};

/// Play time credited to a session when it is first opened.
pub const STANDARD_SESSION_START: TimeDelta = TimeDelta::minutes(2);

/// Prefix carried by goal titles in `meta.goal.progressed` events.
const GOAL_TITLE_PREFIX: &str = "dailyGoal.title.";

/// Outcome of a game, from the robot's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[default]
    Neutral,
    Win,
    Lose,
}

/// The game currently in progress within a session.
///
/// Carried on the session so a game started in one log file can be finished
/// in the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub current_game_name: Option<String>,
    pub current_game_id: Option<String>,
    pub current_result: GameResult,
}

impl GameState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Positive/negative/neutral animation tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentCounts {
    pub const fn add(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

/// Accumulated statistics for one game type within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub name: String,
    pub start_count: u32,
    pub win_count: u32,
    pub lose_count: u32,
    pub neutral_count: u32,
    pub abort_count: u32,
    pub animation_counts: BTreeMap<String, u32>,
    pub animations: SentimentCounts,
}

impl GameDetails {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start_count: 1,
            win_count: 0,
            lose_count: 0,
            neutral_count: 0,
            abort_count: 0,
            animation_counts: BTreeMap::new(),
            animations: SentimentCounts::default(),
        }
    }
}

/// A robot-initiated freeplay activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeplayDetails {
    pub name: String,
    pub start_count: u32,
}

/// Named string accumulators on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    GamesUnlocked,
    FeaturesUnlocked,
    FaceEnrolled,
    FaceRecognized,
    DailyChallenge,
}

/// One interaction session: a run of log files with no 15-minute gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Position of this session within its day, starting at 0.
    pub session_id: usize,
    /// Nominal start, backdated by [`STANDARD_SESSION_START`].
    pub start_time: DateTime<Utc>,
    pub play_time_ms: i64,
    pub play_sessions: u32,
    pub games_unlocked: Vec<String>,
    pub features_unlocked: Vec<String>,
    pub face_enrolled: Vec<String>,
    pub face_recognized: Vec<String>,
    pub daily_challenge: Vec<String>,
    pub goal_progress: Vec<String>,
    pub animations_played: BTreeMap<String, u32>,
    pub animations: SentimentCounts,
    pub pets_recorded: BTreeMap<String, u32>,
    pub robot_requests: BTreeMap<String, u32>,
    pub freeplay_record: BTreeMap<String, FreeplayDetails>,
    pub game_record: BTreeMap<String, GameDetails>,
    #[serde(skip)]
    pub game: GameState,
}

impl SessionData {
    /// Opens a session for a log file written at `log_time`.
    pub fn new(log_time: DateTime<Utc>, session_id: usize) -> Self {
        Self {
            session_id,
            start_time: log_time - STANDARD_SESSION_START,
            play_time_ms: STANDARD_SESSION_START.num_milliseconds(),
            play_sessions: u32::try_from(session_id + 1).unwrap_or(u32::MAX),
            games_unlocked: Vec::new(),
            features_unlocked: Vec::new(),
            face_enrolled: Vec::new(),
            face_recognized: Vec::new(),
            daily_challenge: Vec::new(),
            goal_progress: Vec::new(),
            animations_played: BTreeMap::new(),
            animations: SentimentCounts::default(),
            pets_recorded: BTreeMap::new(),
            robot_requests: BTreeMap::new(),
            freeplay_record: BTreeMap::new(),
            game_record: BTreeMap::new(),
            game: GameState::default(),
        }
    }

    /// Adds elapsed time to the session.
    ///
    /// `None` means a fresh start: the standard two minutes are credited and
    /// the play session count goes up by one.
    pub fn add_time(&mut self, gap: Option<TimeDelta>) {
        if let Some(gap) = gap {
            self.play_time_ms += gap.num_milliseconds();
        } else {
            self.play_time_ms += STANDARD_SESSION_START.num_milliseconds();
            self.play_sessions += 1;
        }
    }

    pub fn play_time(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.play_time_ms)
    }

    /// Counts an animation against the running game, or against the session
    /// when no game is running.
    pub fn record_animation(&mut self, game_name: Option<&str>, animation_name: &str) {
        let sentiment = classify(animation_name);
        let (counts, played) = match game_name {
            Some(name) => {
                let game = self.game_entry(name);
                (&mut game.animations, &mut game.animation_counts)
            }
            None => (&mut self.animations, &mut self.animations_played),
        };
        counts.add(sentiment);
        *played.entry(animation_name.to_string()).or_insert(0) += 1;
    }

    /// Creates the record for a game, or bumps its start count if it exists.
    pub fn create_or_update_game(&mut self, name: &str) {
        self.game_record
            .entry(name.to_string())
            .and_modify(|game| game.start_count += 1)
            .or_insert_with(|| GameDetails::new(name));
    }

    /// Records the outcome of a finished game. Does nothing without a game.
    pub fn end_game(&mut self, name: Option<&str>, result: GameResult) {
        let Some(name) = name else {
            return;
        };
        let game = self.game_entry(name);
        match result {
            GameResult::Neutral => game.neutral_count += 1,
            GameResult::Win => game.win_count += 1,
            GameResult::Lose => game.lose_count += 1,
        }
    }

    /// Counts an implicit end of a game. Unknown games are ignored.
    pub fn abort_game(&mut self, name: &str) {
        if let Some(game) = self.game_record.get_mut(name) {
            game.abort_count += 1;
        }
    }

    /// Appends items to a list accumulator, keeping duplicates.
    pub fn update_record_list<I>(&mut self, key: RecordKey, items: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.record_mut(key).extend(items.into_iter().map(Into::into));
    }

    /// Appends a value to an accumulator unless it is already present.
    pub fn update_record_set(&mut self, key: RecordKey, value: &str) {
        let record = self.record_mut(key);
        if !record.iter().any(|existing| existing == value) {
            record.push(value.to_string());
        }
    }

    pub fn add_update_pet(&mut self, pet_type: &str) {
        *self.pets_recorded.entry(pet_type.to_string()).or_insert(0) += 1;
    }

    pub fn add_update_request(&mut self, request_type: &str) {
        *self
            .robot_requests
            .entry(request_type.to_string())
            .or_insert(0) += 1;
    }

    pub fn add_goal_progress(&mut self, title: &str) {
        self.goal_progress
            .push(title.replace(GOAL_TITLE_PREFIX, ""));
    }

    pub fn create_or_update_free_play(&mut self, name: &str) {
        self.freeplay_record
            .entry(name.to_string())
            .and_modify(|free_play| free_play.start_count += 1)
            .or_insert_with(|| FreeplayDetails {
                name: name.to_string(),
                start_count: 1,
            });
    }

    const fn record_mut(&mut self, key: RecordKey) -> &mut Vec<String> {
        match key {
            RecordKey::GamesUnlocked => &mut self.games_unlocked,
            RecordKey::FeaturesUnlocked => &mut self.features_unlocked,
            RecordKey::FaceEnrolled => &mut self.face_enrolled,
            RecordKey::FaceRecognized => &mut self.face_recognized,
            RecordKey::DailyChallenge => &mut self.daily_challenge,
        }
    }

    fn game_entry(&mut self, name: &str) -> &mut GameDetails {
        self.game_record
            .entry(name.to_string())
            .or_insert_with(|| GameDetails::new(name))
    }
}

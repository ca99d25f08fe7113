//! Event keys as the single source of truth for log key strings, and decoding
//! of raw records into typed events.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log keys the analyser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKey {
    GameUnlockStatus,
    DailyGoals,
    Data,
    SparkUnlockStatus,
    FaceEnrollment,
    GameLaunch,
    GameStart,
    GameType,
    GameEnd,
    GameEndPlayerRank,
    PlayAnimation,
    GoalProgressed,
    FreeplayGoalStarted,
    FaceReRecognized,
    DetectedPet,
}

impl EventKey {
    pub const ALL: [Self; 15] = [
        Self::GameUnlockStatus,
        Self::DailyGoals,
        Self::Data,
        Self::SparkUnlockStatus,
        Self::FaceEnrollment,
        Self::GameLaunch,
        Self::GameStart,
        Self::GameType,
        Self::GameEnd,
        Self::GameEndPlayerRank,
        Self::PlayAnimation,
        Self::GoalProgressed,
        Self::FreeplayGoalStarted,
        Self::FaceReRecognized,
        Self::DetectedPet,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GameUnlockStatus => "robot.game_unlock_status",
            Self::DailyGoals => "world.daily_goals",
            Self::Data => "$data",
            Self::SparkUnlockStatus => "robot.spark_unlock_status",
            Self::FaceEnrollment => "robot.face_enrollment",
            Self::GameLaunch => "game.launch",
            Self::GameStart => "game.start",
            Self::GameType => "game.type",
            Self::GameEnd => "game.end",
            Self::GameEndPlayerRank => "game.end.player_rank",
            Self::PlayAnimation => "robot.play_animation",
            Self::GoalProgressed => "meta.goal.progressed",
            Self::FreeplayGoalStarted => "robot.freeplay_goal_started",
            Self::FaceReRecognized => "robot.vision.face_recognition.re_recognized",
            Self::DetectedPet => "robot.vision.detected_pet",
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a raw log key, the inverse of [`EventKey::as_str`].
impl FromStr for EventKey {
    type Err = UnknownEventKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownEventKey(s.to_string()))
    }
}

/// Error type for unknown event key strings.
#[derive(Debug, Clone)]
pub struct UnknownEventKey(String);

impl fmt::Display for UnknownEventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event key: {}", self.0)
    }
}

impl std::error::Error for UnknownEventKey {}

/// One parsed log object.
///
/// Records are heterogeneous: each carries whichever keys the robot emitted
/// for that line, so every lookup is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(Map<String, Value>);

impl EventRecord {
    /// Returns true if the key is present, whatever its value.
    pub fn contains(&self, key: EventKey) -> bool {
        self.0.contains_key(key.as_str())
    }

    /// Returns the value for `key` as text.
    ///
    /// Numbers and booleans are rendered as their JSON text so `0` and `"0"`
    /// read the same. Null, arrays and objects yield `None`.
    pub fn text(&self, key: EventKey) -> Option<Cow<'_, str>> {
        match self.0.get(key.as_str())? {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// A typed event decoded from an [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    GamesUnlocked(Vec<String>),
    DailyChallenge(String),
    FeaturesUnlocked(Vec<String>),
    FaceEnrolled(String),
    GameLaunch(String),
    GameStart(String),
    GameType(String),
    GameEnd,
    PlayerRank(String),
    Animation(String),
    GoalProgressed(String),
    FreeplayStarted(String),
    FaceRecognized(String),
    PetDetected(String),
}

impl Event {
    /// Decodes every recognised event carried by a record.
    ///
    /// A single record may carry several keys. Events are returned in a fixed
    /// order so that, for example, `game.end` is always handled before a
    /// `game.end.player_rank` on the same line.
    pub fn decode(record: &EventRecord) -> Vec<Self> {
        let text = |key| record.text(key).map(Cow::into_owned);
        let data = text(EventKey::Data);
        let mut events = Vec::new();

        if let Some(status) = text(EventKey::GameUnlockStatus) {
            events.push(Self::GamesUnlocked(split_list(&status)));
        }
        if let Some(data) = data.as_ref().filter(|_| record.contains(EventKey::DailyGoals)) {
            events.push(Self::DailyChallenge(clean_daily_challenge(data)));
        }
        if let Some(status) = text(EventKey::SparkUnlockStatus) {
            events.push(Self::FeaturesUnlocked(split_list(&status)));
        }
        if let Some(face) = text(EventKey::FaceEnrollment) {
            events.push(Self::FaceEnrolled(face));
        }
        if let Some(name) = text(EventKey::GameLaunch) {
            events.push(Self::GameLaunch(name));
        }
        if let Some(id) = text(EventKey::GameStart) {
            events.push(Self::GameStart(id));
        }
        if let Some(name) = text(EventKey::GameType) {
            events.push(Self::GameType(name));
        }
        if record.contains(EventKey::GameEnd) {
            events.push(Self::GameEnd);
        }
        if let Some(rank) = text(EventKey::GameEndPlayerRank) {
            events.push(Self::PlayerRank(rank));
        }
        if let Some(name) = text(EventKey::PlayAnimation) {
            events.push(Self::Animation(name));
        }
        if let Some(title) = text(EventKey::GoalProgressed) {
            events.push(Self::GoalProgressed(title));
        }
        if let Some(name) = text(EventKey::FreeplayGoalStarted) {
            events.push(Self::FreeplayStarted(name));
        }
        if let Some(face) = text(EventKey::FaceReRecognized) {
            events.push(Self::FaceRecognized(face));
        }
        if let Some(pet) = data.filter(|_| record.contains(EventKey::DetectedPet)) {
            events.push(Self::PetDetected(pet));
        }

        events
    }
}

/// Splits a comma separated status list, ignoring outer commas.
fn split_list(value: &str) -> Vec<String> {
    value.trim_matches(',').split(',').map(str::to_string).collect()
}

/// Strips the progress suffix and bold markup from a daily challenge label.
fn clean_daily_challenge(value: &str) -> String {
    value
        .trim_matches(',')
        .trim_matches(|c| matches!(c, '_' | '0' | '/' | '1'))
        .replace("<b>", "")
        .replace("</b>", "")
}

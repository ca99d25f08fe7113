//! Rule-based sentiment classification of animation names.

use serde::{Deserialize, Serialize};

/// Emotional tone of an animation from the robot's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Substrings marking a positive animation, checked in order.
const POSITIVE_KEYWORDS: &[&str] = &[
    "admire",
    "ask",
    "celebrat",
    "find",
    "found",
    "giggle",
    "happy",
    "hello",
    "highenergy",
    "ideatoplay",
    "like",
    "newarea",
    "petdetection",
    "playeryes",
    "request",
    "reacttocube",
    "reenrollment",
    "thankyou",
    "upgrade",
    "wheely",
    "wiggle",
    "turbo",
];

/// Substrings marking a negative animation, checked after the positive list.
const NEGATIVE_KEYWORDS: &[&str] = &[
    "badword",
    "bored",
    "dizzy",
    "frustrated",
    "lowenergy",
    "match_no",
    "playerno",
    "struggle",
    "stuck",
    "upset",
    "turtleroll",
    "hiccup",
];

/// Classifies an animation name. Matching is case-sensitive and the first
/// rule that applies wins.
///
/// Outcome animations are read from the robot's side: the player winning is
/// negative, the player losing is positive, unless the animation is a solo one.
pub fn classify(animation_name: &str) -> Sentiment {
    let has = |needle: &str| animation_name.contains(needle);
    let against_player = has("player") && !has("solo");

    // Curing a hiccup offsets the hiccup itself.
    if has("cure") {
        return Sentiment::Positive;
    }
    if has("win") || has("success") {
        return if against_player {
            Sentiment::Negative
        } else {
            Sentiment::Positive
        };
    }
    if has("lose") || has("fail") {
        return if against_player {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        };
    }
    if has("reacttoface") && !has("unidentified") {
        return Sentiment::Positive;
    }
    // The pet detection "misc" reaction is the sneeze.
    if has("petdetection") && has("misc") {
        return Sentiment::Negative;
    }
    if POSITIVE_KEYWORDS.iter().any(|k| animation_name.contains(k)) {
        return Sentiment::Positive;
    }
    if NEGATIVE_KEYWORDS.iter().any(|k| animation_name.contains(k)) {
        return Sentiment::Negative;
    }
    Sentiment::Neutral
}

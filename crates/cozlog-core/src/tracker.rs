//! Game lifecycle tracking and event dispatch.
//!
//! The logs carry no single authoritative game identifier. A game is inferred
//! from three loosely synchronised signals (`game.launch`, `game.start`,
//! `game.type`), and a game that is replaced by a conflicting signal before
//! its `game.end` is counted as aborted.

use crate::event::{Event, EventRecord};
use crate::session::{GameResult, RecordKey, SessionData};

/// Feeds parsed records into a session, skipping unparseable entries.
pub fn analyse_records(records: &[Option<EventRecord>], session: &mut SessionData) {
    for record in records.iter().flatten() {
        for event in Event::decode(record) {
            apply_event(session, event);
        }
    }
}

/// Applies a single event to a session and its game state.
pub fn apply_event(session: &mut SessionData, event: Event) {
    match event {
        Event::GamesUnlocked(games) => session.update_record_list(RecordKey::GamesUnlocked, games),
        Event::DailyChallenge(label) => {
            session.update_record_set(RecordKey::DailyChallenge, &label);
        }
        Event::FeaturesUnlocked(features) => {
            session.update_record_list(RecordKey::FeaturesUnlocked, features);
        }
        Event::FaceEnrolled(face) => session.update_record_list(RecordKey::FaceEnrolled, [face]),
        Event::GameLaunch(name) => game_launch(session, name),
        Event::GameStart(id) => game_start(session, id),
        Event::GameType(name) => game_type(session, name),
        Event::GameEnd => game_end(session),
        Event::PlayerRank(rank) => player_rank(session, &rank),
        Event::Animation(name) => {
            let game = session.game.current_game_name.clone();
            session.record_animation(game.as_deref(), &name);
            if name.contains("ask") || name.contains("request") {
                session.add_update_request(&name);
            }
        }
        Event::GoalProgressed(title) => session.add_goal_progress(&title),
        Event::FreeplayStarted(name) => session.create_or_update_free_play(&name),
        Event::FaceRecognized(face) => {
            session.update_record_list(RecordKey::FaceRecognized, [face]);
        }
        Event::PetDetected(pet) => session.add_update_pet(&pet),
    }
}

/// Aborts the running game, if any, and forgets any result seen for it.
fn abort_current(session: &mut SessionData) {
    if let Some(name) = session.game.current_game_name.take() {
        tracing::debug!(game = %name, "game aborted");
        session.abort_game(&name);
    }
    session.game.current_result = GameResult::Neutral;
}

fn game_launch(session: &mut SessionData, name: String) {
    abort_current(session);
    session.create_or_update_game(&name);
    session.game.current_game_name = Some(name);
    session.game.current_game_id = None;
}

fn game_start(session: &mut SessionData, id: String) {
    if session.game.current_game_name.is_none() {
        return;
    }
    let conflicting = session
        .game
        .current_game_id
        .as_ref()
        .is_some_and(|current| *current != id);
    if conflicting {
        // A second start id under the same game means the first run was
        // never closed.
        abort_current(session);
    }
    session.game.current_game_id = Some(id);
}

fn game_type(session: &mut SessionData, name: String) {
    if session.game.current_game_name.as_deref() == Some(name.as_str()) {
        return;
    }
    abort_current(session);
    session.create_or_update_game(&name);
    session.game.current_game_name = Some(name);
    session.game.current_game_id = None;
}

fn game_end(session: &mut SessionData) {
    let name = session.game.current_game_name.take();
    session.end_game(name.as_deref(), session.game.current_result);
    session.game.reset();
}

fn player_rank(session: &mut SessionData, rank: &str) {
    if session.game.current_game_name.is_none() {
        return;
    }
    // Rank "0" means the player came first, so the robot lost.
    session.game.current_result = if rank == "0" {
        GameResult::Lose
    } else {
        GameResult::Win
    };
}

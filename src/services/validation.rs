//! Business rules checked before an event reaches the state machine.
//!
//! The state machine applies events unconditionally once its terminal and
//! phase guards pass; everything here is scoring policy on top of it.

use std::collections::HashSet;

use crate::{
    error::ServiceError,
    state::{
        events::{AtBatResult, EventBody, GameEndPayload, GameEvent, GameStartPayload},
        game::{GameSnapshot, GameStatus, ScoringMethod},
    },
};

/// Check `event` against the current snapshot.
///
/// Events the state machine itself rejects (anything on a completed game,
/// gameplay before the start) are let through so its error is reported.
pub fn validate_event(snapshot: &GameSnapshot, event: &GameEvent) -> Result<(), ServiceError> {
    if snapshot.is_completed() {
        return Ok(());
    }
    if event.kind().is_gameplay() && snapshot.status != GameStatus::InProgress {
        return Ok(());
    }

    ensure_assigned_umpire(snapshot, event)?;

    match &event.body {
        EventBody::Pitch(_) => validate_pitch(snapshot),
        EventBody::FlipCup(_) => {
            if snapshot.pending_cup_hit.is_none() {
                return Err(ServiceError::InvalidState(
                    "flip cup requires a cup hit waiting to be contested".into(),
                ));
            }
            Ok(())
        }
        EventBody::AtBat(payload) => {
            ensure_no_pending_cup_hit(snapshot)?;
            if payload.result == AtBatResult::Walk && snapshot.balls != 4 {
                return Err(ServiceError::InvalidInput(format!(
                    "walk requires exactly 4 balls (count has {})",
                    snapshot.balls
                )));
            }
            Ok(())
        }
        EventBody::GameStart(payload) => validate_game_start(payload),
        EventBody::GameEnd(payload) => validate_game_end(snapshot, payload),
        EventBody::Takeover(payload) => {
            if payload.new_umpire_id.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "new umpire id must not be empty".into(),
                ));
            }
            if snapshot.umpire_id.as_deref() == Some(payload.new_umpire_id.as_str()) {
                return Err(ServiceError::InvalidInput(format!(
                    "umpire `{}` already runs this game",
                    payload.new_umpire_id
                )));
            }
            Ok(())
        }
        EventBody::Undo(_) | EventBody::Edit(_) => {
            if snapshot.status == GameStatus::NotStarted {
                return Err(ServiceError::InvalidState(
                    "game has no scoring events to change".into(),
                ));
            }
            Ok(())
        }
    }
}

/// Only the assigned umpire may score; `game_start` and `takeover` are how one gets assigned.
fn ensure_assigned_umpire(snapshot: &GameSnapshot, event: &GameEvent) -> Result<(), ServiceError> {
    if matches!(event.body, EventBody::GameStart(_) | EventBody::Takeover(_)) {
        return Ok(());
    }
    match snapshot.umpire_id.as_deref() {
        Some(assigned) if assigned != event.umpire_id => Err(ServiceError::Unauthorized(format!(
            "umpire `{}` is not assigned to game `{}`",
            event.umpire_id, snapshot.game_id
        ))),
        _ => Ok(()),
    }
}

fn ensure_no_pending_cup_hit(snapshot: &GameSnapshot) -> Result<(), ServiceError> {
    if snapshot.pending_cup_hit.is_some() {
        return Err(ServiceError::InvalidState(
            "a cup hit is waiting for its flip cup".into(),
        ));
    }
    Ok(())
}

fn validate_pitch(snapshot: &GameSnapshot) -> Result<(), ServiceError> {
    ensure_no_pending_cup_hit(snapshot)?;
    if snapshot.balls >= 4 {
        return Err(ServiceError::InvalidState(
            "four balls: record the walk before the next pitch".into(),
        ));
    }
    if snapshot.strikes >= 3 {
        return Err(ServiceError::InvalidState(
            "three strikes: record the out before the next pitch".into(),
        ));
    }
    Ok(())
}

fn validate_game_start(payload: &GameStartPayload) -> Result<(), ServiceError> {
    if payload.umpire_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("umpire id must not be empty".into()));
    }
    if payload.home_team_id == payload.away_team_id {
        return Err(ServiceError::InvalidInput(format!(
            "team `{}` cannot play itself",
            payload.home_team_id
        )));
    }
    if payload.lineups.home.is_empty() || payload.lineups.away.is_empty() {
        return Err(ServiceError::InvalidInput(
            "both lineups need at least one player".into(),
        ));
    }
    if payload.innings == 0 {
        return Err(ServiceError::InvalidInput(
            "a game needs at least one inning".into(),
        ));
    }

    let home: HashSet<&str> = payload.lineups.home.iter().map(String::as_str).collect();
    if let Some(shared) = payload
        .lineups
        .away
        .iter()
        .find(|player| home.contains(player.as_str()))
    {
        return Err(ServiceError::InvalidInput(format!(
            "player `{shared}` appears in both lineups"
        )));
    }

    Ok(())
}

fn validate_game_end(snapshot: &GameSnapshot, payload: &GameEndPayload) -> Result<(), ServiceError> {
    if payload.scoring_method == Some(ScoringMethod::QuickResult) {
        return Ok(());
    }
    if snapshot.status == GameStatus::NotStarted {
        return Err(ServiceError::InvalidState(
            "a game that never started can only end with a quick result".into(),
        ));
    }
    if (payload.final_score_home, payload.final_score_away)
        != (snapshot.score_home, snapshot.score_away)
    {
        return Err(ServiceError::InvalidInput(format!(
            "final score {}-{} does not match live score {}-{}",
            payload.final_score_home,
            payload.final_score_away,
            snapshot.score_home,
            snapshot.score_away
        )));
    }
    Ok(())
}

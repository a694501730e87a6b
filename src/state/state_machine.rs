//! Pure transition function encoding the rules of a live-scored game.
//!
//! [`transition`] never mutates its input and performs no I/O: the caller
//! serializes calls per game, persists the returned snapshot, and applies the
//! returned [`SideEffect`]s.

use thiserror::Error;

use crate::state::{
    events::{
        AtBatPayload, AtBatResult, EventBody, FlipCupPayload, FlipCupResult,
        GameEndPayload, GameEvent, GameStartPayload, PitchPayload, PitchResult, TakeoverPayload,
    },
    game::{
        BaseRunners, CupHit, GameId, GameSnapshot, GameStatus, ParticipantId, ScoringMethod,
        TeamId,
    },
};

/// Rule violations reported by [`transition`]. The snapshot is returned unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Completed games are frozen.
    #[error("Cannot modify completed games")]
    GameCompleted,
    /// Pitch, flip cup and at bat need a game in progress.
    #[error("Game must be in progress for gameplay events")]
    NotInProgress,
    /// `game_start` applies to a game that has not started yet.
    #[error("Game has already started")]
    AlreadyStarted,
}

/// Work the caller must carry out after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Write the starting teams onto the parent game record.
    AssignTeams {
        /// Game that just started.
        game_id: GameId,
        /// Home team.
        home_team_id: TeamId,
        /// Away team.
        away_team_id: TeamId,
    },
    /// The game completed; store the result and notify standings.
    RecordFinalResult {
        /// Game that completed.
        game_id: GameId,
        /// Final home score.
        final_score_home: u32,
        /// Final away score.
        final_score_away: u32,
        /// How the score was obtained.
        scoring_method: ScoringMethod,
        /// Umpire notes attached to the result.
        notes: Option<String>,
    },
    /// An undo or edit was accepted; rebuild the snapshot from the event history.
    RebuildFromHistory,
}

/// Result of [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Next snapshot, or a copy of the input when `error` is set.
    pub snapshot: GameSnapshot,
    /// Rule violation that prevented the transition.
    pub error: Option<TransitionError>,
    /// Follow-up work for the caller.
    pub side_effects: Vec<SideEffect>,
}

impl TransitionOutcome {
    fn applied(snapshot: GameSnapshot, side_effects: Vec<SideEffect>) -> Self {
        Self {
            snapshot,
            error: None,
            side_effects,
        }
    }

    fn rejected(snapshot: &GameSnapshot, error: TransitionError) -> Self {
        Self {
            snapshot: snapshot.clone(),
            error: Some(error),
            side_effects: Vec::new(),
        }
    }

    /// Whether the event was applied.
    pub fn is_applied(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, dropping the unchanged snapshot on rejection.
    pub fn into_result(self) -> Result<(GameSnapshot, Vec<SideEffect>), TransitionError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.snapshot, self.side_effects)),
        }
    }
}

/// Apply `event` to `snapshot`.
///
/// `recent_events` is only consulted by a flip cup when the snapshot carries
/// no pending cup hit; the hit then comes from the immediately preceding pitch.
pub fn transition(
    snapshot: &GameSnapshot,
    event: &GameEvent,
    recent_events: &[GameEvent],
) -> TransitionOutcome {
    if snapshot.status == GameStatus::Completed {
        return TransitionOutcome::rejected(snapshot, TransitionError::GameCompleted);
    }
    if event.kind().is_gameplay() && snapshot.status != GameStatus::InProgress {
        return TransitionOutcome::rejected(snapshot, TransitionError::NotInProgress);
    }

    let mut next = snapshot.clone();
    next.last_updated = event.created_at;

    let side_effects = match &event.body {
        EventBody::Pitch(payload) => {
            apply_pitch(&mut next, payload);
            Vec::new()
        }
        EventBody::FlipCup(payload) => {
            let hit = next
                .pending_cup_hit
                .or_else(|| preceding_cup_hit(event, recent_events));
            apply_flip_cup(&mut next, payload, hit);
            Vec::new()
        }
        EventBody::AtBat(payload) => {
            apply_at_bat(&mut next, payload);
            Vec::new()
        }
        EventBody::GameStart(payload) => {
            if snapshot.status != GameStatus::NotStarted {
                return TransitionOutcome::rejected(snapshot, TransitionError::AlreadyStarted);
            }
            apply_game_start(&mut next, payload)
        }
        EventBody::GameEnd(payload) => apply_game_end(&mut next, payload),
        EventBody::Takeover(TakeoverPayload { new_umpire_id }) => {
            next.umpire_id = Some(new_umpire_id.clone());
            Vec::new()
        }
        EventBody::Undo(_) | EventBody::Edit(_) => vec![SideEffect::RebuildFromHistory],
    };

    TransitionOutcome::applied(next, side_effects)
}

fn apply_pitch(next: &mut GameSnapshot, payload: &PitchPayload) {
    next.batter_id = Some(payload.batter_id.clone());
    next.catcher_id = Some(payload.catcher_id.clone());
    next.pending_cup_hit = payload.result.cup_hit();

    match payload.result {
        // A foul with two strikes is a third strike under house rules.
        PitchResult::Strike | PitchResult::FoulBall => next.strikes = next.strikes.saturating_add(1),
        PitchResult::Ball => next.balls = next.balls.saturating_add(1),
        PitchResult::FirstCupHit
        | PitchResult::SecondCupHit
        | PitchResult::ThirdCupHit
        | PitchResult::FourthCupHit => {}
    }
}

fn apply_flip_cup(next: &mut GameSnapshot, payload: &FlipCupPayload, hit: Option<CupHit>) {
    next.catcher_id = Some(payload.catcher_id.clone());
    next.pending_cup_hit = None;

    match payload.result {
        FlipCupResult::OffenseWins => {
            let bases = hit.map_or(1, CupHit::bases);
            advance_runners(next, &payload.batter_id, bases);
        }
        FlipCupResult::DefenseWins => next.outs = next.outs.saturating_add(1),
    }

    finish_plate_appearance(next);
}

fn apply_at_bat(next: &mut GameSnapshot, payload: &AtBatPayload) {
    next.catcher_id = Some(payload.catcher_id.clone());
    next.pending_cup_hit = None;

    match payload.result {
        AtBatResult::Out => next.outs = next.outs.saturating_add(1),
        AtBatResult::Walk => {
            let (runners, runs) = next.base_runners.force_walk(&payload.batter_id);
            next.base_runners = runners;
            next.add_runs(runs);
        }
        hit => {
            let bases = hit.hit_bases().unwrap_or(1);
            advance_runners(next, &payload.batter_id, bases);
        }
    }

    finish_plate_appearance(next);
}

fn advance_runners(next: &mut GameSnapshot, batter: &ParticipantId, bases: u8) {
    let (runners, runs) = next.base_runners.advance(batter, bases);
    next.base_runners = runners;
    next.add_runs(runs);
}

/// Reset the count, bring up the next batter, and change sides on the third out.
fn finish_plate_appearance(next: &mut GameSnapshot) {
    next.reset_count();
    next.advance_lineup();
    next.retire_side_if_three_outs();
}

fn apply_game_start(next: &mut GameSnapshot, payload: &GameStartPayload) -> Vec<SideEffect> {
    next.status = GameStatus::InProgress;
    next.current_inning = 1;
    next.is_top_of_inning = true;
    next.outs = 0;
    next.reset_count();
    next.score_home = 0;
    next.score_away = 0;
    next.home_team_id = Some(payload.home_team_id.clone());
    next.away_team_id = Some(payload.away_team_id.clone());
    next.home_lineup = payload.lineups.home.clone();
    next.away_lineup = payload.lineups.away.clone();
    next.home_lineup_position = 0;
    next.away_lineup_position = 0;
    next.batter_id = next.away_lineup.first().cloned();
    next.catcher_id = None;
    next.base_runners = BaseRunners::default();
    next.umpire_id = Some(payload.umpire_id.clone());
    next.scheduled_innings = payload.innings;
    next.pending_cup_hit = None;

    vec![SideEffect::AssignTeams {
        game_id: next.game_id,
        home_team_id: payload.home_team_id.clone(),
        away_team_id: payload.away_team_id.clone(),
    }]
}

fn apply_game_end(next: &mut GameSnapshot, payload: &GameEndPayload) -> Vec<SideEffect> {
    let scoring_method = payload.scoring_method.unwrap_or(ScoringMethod::Live);

    next.status = GameStatus::Completed;
    next.score_home = payload.final_score_home;
    next.score_away = payload.final_score_away;
    next.scoring_method = Some(scoring_method);
    next.is_quick_result = scoring_method == ScoringMethod::QuickResult;
    next.pending_cup_hit = None;

    vec![SideEffect::RecordFinalResult {
        game_id: next.game_id,
        final_score_home: payload.final_score_home,
        final_score_away: payload.final_score_away,
        scoring_method,
        notes: payload.notes.clone(),
    }]
}

/// Cup hit of the gameplay event immediately before `event`, if that event was
/// a cup-hit pitch. A flip cup or at bat in between means the hit was consumed.
pub fn preceding_cup_hit(event: &GameEvent, recent_events: &[GameEvent]) -> Option<CupHit> {
    recent_events
        .iter()
        .filter(|candidate| {
            candidate.sequence_number < event.sequence_number && candidate.kind().is_gameplay()
        })
        .max_by_key(|candidate| candidate.sequence_number)
        .and_then(|candidate| match &candidate.body {
            EventBody::Pitch(pitch) => pitch.result.cup_hit(),
            _ => None,
        })
}

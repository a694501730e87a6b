//! Snapshot reconstruction from the event log after an undo or edit.

use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    services::validation::validate_event,
    state::{
        events::{EventBody, GameEvent},
        game::{GameId, GameSnapshot},
        transition,
    },
};

/// The log with every undo and edit resolved, in sequence order.
///
/// Undo removes its target, or the latest gameplay event still in effect when
/// no target is named. Edit swaps the target's body for the replacement and
/// keeps its position. Both only reach pitch, flip cup and at bat events.
pub fn effective_history(log: &[GameEvent]) -> Result<Vec<GameEvent>, ServiceError> {
    Ok(resolve(log)?.into_iter().map(|entry| entry.event).collect())
}

/// An event in effect, with the id of the edit that last replaced its body.
struct Effective {
    event: GameEvent,
    edited_by: Option<Uuid>,
}

fn resolve(log: &[GameEvent]) -> Result<Vec<Effective>, ServiceError> {
    let mut effective: Vec<Effective> = Vec::with_capacity(log.len());

    for event in log {
        match &event.body {
            EventBody::Undo(payload) => {
                let index = match payload.target_event_id {
                    Some(target) => gameplay_position(&effective, target)?,
                    None => effective
                        .iter()
                        .rposition(|candidate| candidate.event.kind().is_gameplay())
                        .ok_or_else(|| {
                            ServiceError::InvalidInput("there is no gameplay event to undo".into())
                        })?,
                };
                let removed = effective.remove(index);
                debug!(
                    undo = %event.id,
                    target = %removed.event.id,
                    kind = %removed.event.kind(),
                    "undo resolved"
                );
            }
            EventBody::Edit(payload) => {
                let index = gameplay_position(&effective, payload.target_event_id)?;
                let entry = &mut effective[index];
                entry.event.body = payload.replacement.clone().into();
                entry.edited_by = Some(event.id);
            }
            _ => effective.push(Effective {
                event: event.clone(),
                edited_by: None,
            }),
        }
    }

    Ok(effective)
}

fn gameplay_position(effective: &[Effective], target: Uuid) -> Result<usize, ServiceError> {
    effective
        .iter()
        .position(|candidate| candidate.event.id == target && candidate.event.kind().is_gameplay())
        .ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "event `{target}` is not a gameplay event in effect"
            ))
        })
}

/// Replay `log` from an empty snapshot. `window` bounds the history each step sees.
///
/// Edited events go through the same scoring rules as a direct submission
/// at the point where they now sit in the game.
///
/// The returned snapshot is stamped with the time of the last logged event,
/// which is normally the undo or edit that asked for the rebuild.
pub fn rebuild(
    game_id: GameId,
    log: &[GameEvent],
    window: usize,
) -> Result<GameSnapshot, ServiceError> {
    let (history, edits): (Vec<GameEvent>, Vec<Option<Uuid>>) = resolve(log)?
        .into_iter()
        .map(|entry| (entry.event, entry.edited_by))
        .unzip();
    let mut snapshot = GameSnapshot::not_started(game_id);

    for (index, (event, edited_by)) in history.iter().zip(&edits).enumerate() {
        if let Some(edit_id) = edited_by {
            validate_event(&snapshot, event).map_err(|err| {
                ServiceError::InvalidInput(format!(
                    "edit `{edit_id}` of event #{} breaks the scoring rules: {err}",
                    event.sequence_number
                ))
            })?;
        }

        let recent = &history[index.saturating_sub(window)..index];
        let outcome = transition(&snapshot, event, recent);
        match outcome.error {
            Some(err) => {
                return Err(ServiceError::InvalidInput(format!(
                    "history no longer replays at event #{}: {err}",
                    event.sequence_number
                )));
            }
            None => snapshot = outcome.snapshot,
        }
    }

    if let Some(last) = log.last() {
        snapshot.last_updated = last.created_at;
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;
    use crate::state::{
        events::{
            AtBatPayload, AtBatResult, EditPayload, GameEndPayload, GameStartPayload,
            GameplayBody, Lineups, PitchPayload, PitchResult, UndoPayload,
        },
        game::GameStatus,
    };

    struct Log {
        events: Vec<GameEvent>,
    }

    impl Log {
        fn started() -> Self {
            let mut log = Self { events: Vec::new() };
            log.push(EventBody::GameStart(GameStartPayload {
                umpire_id: "ump".into(),
                home_team_id: "home".into(),
                away_team_id: "away".into(),
                lineups: Lineups {
                    home: vec!["h1".into(), "h2".into()],
                    away: vec!["a1".into(), "a2".into()],
                },
                innings: 7,
            }));
            log
        }

        fn push(&mut self, body: EventBody) -> Uuid {
            let sequence_number = self.events.len() as u64 + 1;
            let event = GameEvent {
                id: Uuid::new_v4(),
                game_id: Uuid::nil(),
                umpire_id: "ump".into(),
                sequence_number,
                created_at: UNIX_EPOCH + Duration::from_secs(sequence_number),
                body,
            };
            let id = event.id;
            self.events.push(event);
            id
        }

        fn pitch(&mut self, result: PitchResult) -> Uuid {
            self.push(EventBody::Pitch(PitchPayload {
                result,
                batter_id: "a1".into(),
                catcher_id: "h1".into(),
            }))
        }

        fn at_bat(&mut self, result: AtBatResult) -> Uuid {
            self.push(EventBody::AtBat(AtBatPayload {
                result,
                batter_id: "a1".into(),
                catcher_id: "h1".into(),
            }))
        }

        fn rebuild(&self) -> Result<GameSnapshot, ServiceError> {
            rebuild(Uuid::nil(), &self.events, 20)
        }
    }

    #[test]
    fn undo_of_last_pitch_restores_the_count() {
        let mut log = Log::started();
        log.pitch(PitchResult::Strike);
        log.pitch(PitchResult::Ball);
        log.push(EventBody::Undo(UndoPayload::default()));

        let snapshot = log.rebuild().unwrap();

        assert_eq!((snapshot.balls, snapshot.strikes), (0, 1));
        assert_eq!(snapshot.last_updated, UNIX_EPOCH + Duration::from_secs(4));
    }

    #[test]
    fn undo_by_id_removes_an_earlier_event() {
        let mut log = Log::started();
        let first = log.pitch(PitchResult::Strike);
        log.pitch(PitchResult::Strike);
        log.push(EventBody::Undo(UndoPayload {
            target_event_id: Some(first),
        }));

        assert_eq!(log.rebuild().unwrap().strikes, 1);
    }

    #[test]
    fn edit_recomputes_the_score() {
        let mut log = Log::started();
        let hit = log.at_bat(AtBatResult::Single);
        assert_eq!(log.rebuild().unwrap().score_away, 0);

        log.push(EventBody::Edit(EditPayload {
            target_event_id: hit,
            replacement: GameplayBody::AtBat(AtBatPayload {
                result: AtBatResult::Homerun,
                batter_id: "a1".into(),
                catcher_id: "h1".into(),
            }),
        }));

        let snapshot = log.rebuild().unwrap();
        assert_eq!(snapshot.score_away, 1);
        assert!(snapshot.base_runners.is_empty());
    }

    #[test]
    fn edit_is_held_to_the_scoring_rules() {
        let mut log = Log::started();
        let strike = log.pitch(PitchResult::Strike);
        log.push(EventBody::Edit(EditPayload {
            target_event_id: strike,
            replacement: GameplayBody::AtBat(AtBatPayload {
                result: AtBatResult::Walk,
                batter_id: "a1".into(),
                catcher_id: "h1".into(),
            }),
        }));

        match log.rebuild() {
            Err(ServiceError::InvalidInput(message)) => assert!(message.contains("4 balls")),
            other => panic!("unexpected rebuild result: {other:?}"),
        }
    }

    #[test]
    fn edit_into_flip_cup_needs_a_pending_cup_hit() {
        let mut log = Log::started();
        let ball = log.pitch(PitchResult::Ball);
        log.push(EventBody::Edit(EditPayload {
            target_event_id: ball,
            replacement: GameplayBody::FlipCup(crate::state::events::FlipCupPayload {
                result: crate::state::events::FlipCupResult::OffenseWins,
                batter_id: "a1".into(),
                catcher_id: "h1".into(),
                errors: None,
            }),
        }));

        assert!(matches!(log.rebuild(), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn undone_events_cannot_be_targeted_again() {
        let mut log = Log::started();
        let pitch = log.pitch(PitchResult::Ball);
        log.push(EventBody::Undo(UndoPayload {
            target_event_id: Some(pitch),
        }));
        log.push(EventBody::Undo(UndoPayload {
            target_event_id: Some(pitch),
        }));

        assert!(matches!(log.rebuild(), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn lifecycle_events_are_not_undoable() {
        let mut log = Log::started();
        let start = log.events[0].id;
        log.push(EventBody::Undo(UndoPayload {
            target_event_id: Some(start),
        }));
        assert!(log.rebuild().is_err());

        let mut empty = Log::started();
        empty.push(EventBody::Undo(UndoPayload::default()));
        assert!(empty.rebuild().is_err());
    }

    #[test]
    fn replay_matches_live_folding() {
        let mut log = Log::started();
        log.pitch(PitchResult::Ball);
        log.at_bat(AtBatResult::Double);
        log.at_bat(AtBatResult::Out);
        log.push(EventBody::GameEnd(GameEndPayload {
            final_score_home: 0,
            final_score_away: 0,
            notes: None,
            scoring_method: None,
        }));

        let mut live = GameSnapshot::not_started(Uuid::nil());
        for (index, event) in log.events.iter().enumerate() {
            live = transition(&live, event, &log.events[..index]).snapshot;
        }

        let replayed = log.rebuild().unwrap();
        assert_eq!(replayed, live);
        assert_eq!(replayed.status, GameStatus::Completed);
    }
}

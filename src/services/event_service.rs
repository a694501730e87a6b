use std::{sync::Arc, time::SystemTime};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::GameRecordEntity},
    dto::event::{SubmitEventRequest, SubmitEventResponse},
    error::ServiceError,
    services::{completion::GameCompleted, replay, validation::validate_event},
    state::{
        SharedState, SideEffect,
        events::{EventBody, GameEvent},
        game::{GameId, GameSnapshot, GameStatus},
        transition,
    },
};

/// Validate, apply and persist one scoring event.
///
/// Nothing is written when the event is rejected. An accepted event and the
/// snapshot it produced are committed to the store in one write.
pub async fn submit_event(
    state: &SharedState,
    game_id: GameId,
    request: SubmitEventRequest,
) -> Result<SubmitEventResponse, ServiceError> {
    let SubmitEventRequest {
        kind,
        payload,
        umpire_id,
    } = request;
    let body = EventBody::decode(&kind, payload)?;

    let (event, snapshot) = state
        .run_serialized(
            game_id,
            move || prepare_event(state, game_id, umpire_id, body),
            |prepared| commit_event(state, prepared),
        )
        .await?;

    Ok(SubmitEventResponse::new(&event, &snapshot))
}

/// An accepted event with everything needed to persist it.
struct PreparedEvent {
    event: GameEvent,
    snapshot: GameSnapshot,
    side_effects: Vec<SideEffect>,
}

async fn prepare_event(
    state: &SharedState,
    game_id: GameId,
    umpire_id: String,
    body: EventBody,
) -> Result<PreparedEvent, ServiceError> {
    let store = state.game_store();
    let window = state.config().recent_events_window;

    let snapshot = match store.load_snapshot(game_id).await? {
        Some(snapshot) => snapshot,
        None if matches!(body, EventBody::GameStart(_)) => GameSnapshot::not_started(game_id),
        None => return Err(ServiceError::NotFound(format!("game `{game_id}` not found"))),
    };

    let recent = store.recent_events(game_id, window).await?;
    let sequence_number = recent.last().map_or(1, |last| last.sequence_number + 1);
    let event = GameEvent {
        id: Uuid::new_v4(),
        game_id,
        umpire_id,
        sequence_number,
        created_at: SystemTime::now(),
        body,
    };

    validate_event(&snapshot, &event)?;

    let (mut next, side_effects) = transition(&snapshot, &event, &recent)
        .into_result()
        .map_err(|err| {
            warn!(%game_id, kind = %event.kind(), error = %err, "event rejected");
            ServiceError::from(err)
        })?;

    if side_effects.contains(&SideEffect::RebuildFromHistory) {
        let mut log = store.list_events(game_id).await?;
        log.push(event.clone());
        next = replay::rebuild(game_id, &log, window)?;
    }

    Ok(PreparedEvent {
        event,
        snapshot: next,
        side_effects,
    })
}

async fn commit_event(
    state: &SharedState,
    prepared: PreparedEvent,
) -> Result<(GameEvent, GameSnapshot), ServiceError> {
    let PreparedEvent {
        event,
        snapshot,
        side_effects,
    } = prepared;
    let store = state.game_store();

    store.commit(event.clone(), snapshot.clone()).await?;

    for effect in side_effects {
        apply_side_effect(state, &store, effect, event.created_at).await?;
    }

    info!(
        game_id = %event.game_id,
        sequence_number = event.sequence_number,
        kind = %event.kind(),
        inning = snapshot.current_inning,
        top = snapshot.is_top_of_inning,
        outs = snapshot.outs,
        score_home = snapshot.score_home,
        score_away = snapshot.score_away,
        "event applied"
    );

    Ok((event, snapshot))
}

async fn apply_side_effect(
    state: &SharedState,
    store: &Arc<dyn GameStore>,
    effect: SideEffect,
    now: SystemTime,
) -> Result<(), ServiceError> {
    match effect {
        SideEffect::AssignTeams {
            game_id,
            home_team_id,
            away_team_id,
        } => {
            let mut record = load_or_create_record(store, game_id, now).await?;
            record.home_team_id = Some(home_team_id);
            record.away_team_id = Some(away_team_id);
            record.status = GameStatus::InProgress;
            record.updated_at = now;
            store.save_game_record(record).await?;
        }
        SideEffect::RecordFinalResult {
            game_id,
            final_score_home,
            final_score_away,
            scoring_method,
            notes,
        } => {
            let mut record = load_or_create_record(store, game_id, now).await?;
            record.status = GameStatus::Completed;
            record.final_score_home = Some(final_score_home);
            record.final_score_away = Some(final_score_away);
            record.scoring_method = Some(scoring_method);
            record.notes = notes;
            record.updated_at = now;
            store.save_game_record(record).await?;

            state.publish_completion(GameCompleted {
                game_id,
                final_score_home,
                final_score_away,
                scoring_method,
            });
        }
        // Already handled before persisting.
        SideEffect::RebuildFromHistory => {}
    }
    Ok(())
}

async fn load_or_create_record(
    store: &Arc<dyn GameStore>,
    game_id: GameId,
    now: SystemTime,
) -> Result<GameRecordEntity, ServiceError> {
    Ok(store
        .find_game_record(game_id)
        .await?
        .unwrap_or_else(|| GameRecordEntity::new(game_id, now)))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::memory::InMemoryGameStore,
        state::{AppState, game::ScoringMethod},
    };

    fn new_state() -> SharedState {
        AppState::new(Arc::new(InMemoryGameStore::new()), AppConfig::default())
    }

    fn request(kind: &str, payload: Value) -> SubmitEventRequest {
        SubmitEventRequest {
            kind: kind.into(),
            payload,
            umpire_id: "ump".into(),
        }
    }

    async fn start(state: &SharedState, game_id: GameId) {
        let payload = json!({
            "umpire_id": "ump",
            "home_team_id": "home",
            "away_team_id": "away",
            "lineups": { "home": ["h1", "h2"], "away": ["a1", "a2"] }
        });
        submit_event(state, game_id, request("game_start", payload))
            .await
            .unwrap();
    }

    fn pitch(result: &str) -> SubmitEventRequest {
        request(
            "pitch",
            json!({ "result": result, "batter_id": "a1", "catcher_id": "h1" }),
        )
    }

    #[tokio::test]
    async fn game_start_creates_snapshot_and_record() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let store = state.game_store();
        let snapshot = store.load_snapshot(game_id).await.unwrap().unwrap();
        assert_eq!(snapshot.status, GameStatus::InProgress);
        assert_eq!(snapshot.batter_id.as_deref(), Some("a1"));

        let record = store.find_game_record(game_id).await.unwrap().unwrap();
        assert_eq!(record.home_team_id.as_deref(), Some("home"));
        assert_eq!(record.status, GameStatus::InProgress);
    }

    #[tokio::test]
    async fn events_get_consecutive_sequence_numbers() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let first = submit_event(&state, game_id, pitch("strike")).await.unwrap();
        let second = submit_event(&state, game_id, pitch("ball")).await.unwrap();

        assert_eq!(first.event.sequence_number, 2);
        assert_eq!(second.event.sequence_number, 3);
        assert_eq!((second.snapshot.balls, second.snapshot.strikes), (1, 1));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let state = new_state();
        let err = submit_event(&state, Uuid::new_v4(), pitch("ball"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejected_events_are_not_persisted() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let err = submit_event(&state, game_id, request("rain_delay", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let mut intruder = pitch("ball");
        intruder.umpire_id = "intruder".into();
        let err = submit_event(&state, game_id, intruder).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        assert_eq!(
            state.game_store().list_events(game_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn cup_hit_and_flip_cup_score_a_runner() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let hit = submit_event(&state, game_id, pitch("fourth cup hit"))
            .await
            .unwrap();
        assert_eq!(hit.snapshot.pending_cup_hit, Some(crate::state::game::CupHit::Fourth));

        let flip = request(
            "flip_cup",
            json!({ "result": "offense wins", "batter_id": "a1", "catcher_id": "h1" }),
        );
        let response = submit_event(&state, game_id, flip).await.unwrap();

        assert_eq!(response.snapshot.score_away, 1);
        assert_eq!(response.snapshot.pending_cup_hit, None);
        assert_eq!(response.snapshot.batter_id.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn undo_rebuilds_from_history() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;
        submit_event(&state, game_id, pitch("strike")).await.unwrap();
        submit_event(&state, game_id, pitch("strike")).await.unwrap();

        let response = submit_event(&state, game_id, request("undo", Value::Null))
            .await
            .unwrap();

        assert_eq!(response.snapshot.strikes, 1);
        assert_eq!(response.event.sequence_number, 4);
        let stored = state.game_store().load_snapshot(game_id).await.unwrap().unwrap();
        assert_eq!(stored.strikes, 1);
    }

    #[tokio::test]
    async fn edit_breaking_the_rules_is_not_persisted() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;
        let strike = submit_event(&state, game_id, pitch("strike")).await.unwrap();

        let edit = request(
            "edit",
            json!({
                "target_event_id": strike.event.id,
                "replacement": {
                    "type": "at_bat",
                    "payload": { "result": "walk", "batter_id": "a1", "catcher_id": "h1" }
                }
            }),
        );
        let err = submit_event(&state, game_id, edit).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let store = state.game_store();
        assert_eq!(store.list_events(game_id).await.unwrap().len(), 2);
        let snapshot = store.load_snapshot(game_id).await.unwrap().unwrap();
        assert_eq!(snapshot.strikes, 1);
        assert!(snapshot.base_runners.is_empty());
    }

    #[tokio::test]
    async fn repeated_flip_cup_does_not_score_twice() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;
        submit_event(&state, game_id, pitch("fourth cup hit")).await.unwrap();

        let flip = || {
            request(
                "flip_cup",
                json!({ "result": "offense wins", "batter_id": "a1", "catcher_id": "h1" }),
            )
        };
        let first = submit_event(&state, game_id, flip()).await.unwrap();
        assert_eq!(first.snapshot.score_away, 1);

        let err = submit_event(&state, game_id, flip()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        let snapshot = state.game_store().load_snapshot(game_id).await.unwrap().unwrap();
        assert_eq!(snapshot.score_away, 1);
    }

    #[tokio::test]
    async fn quick_result_completes_and_notifies() {
        let state = new_state();
        let mut completions = state.subscribe_completions();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let end = request(
            "game_end",
            json!({
                "final_score_home": 5,
                "final_score_away": 2,
                "scoring_method": "quick_result",
                "notes": "rain shortened"
            }),
        );
        let response = submit_event(&state, game_id, end).await.unwrap();
        assert_eq!(response.snapshot.status, GameStatus::Completed);
        assert!(response.snapshot.is_quick_result);

        let completed = completions.recv().await.unwrap();
        assert_eq!(completed.game_id, game_id);
        assert_eq!(completed.scoring_method, ScoringMethod::QuickResult);

        let record = state.game_store().find_game_record(game_id).await.unwrap().unwrap();
        assert_eq!(record.final_score_home, Some(5));
        assert_eq!(record.notes.as_deref(), Some("rain shortened"));

        let err = submit_event(&state, game_id, pitch("ball")).await.unwrap_err();
        match err {
            ServiceError::InvalidState(message) => {
                assert_eq!(message, "Cannot modify completed games")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_game_start_is_rejected() {
        let state = new_state();
        let game_id = Uuid::new_v4();
        start(&state, game_id).await;

        let payload = json!({
            "umpire_id": "ump",
            "home_team_id": "home",
            "away_team_id": "away",
            "lineups": { "home": ["h1"], "away": ["a1"] }
        });
        let err = submit_event(&state, game_id, request("game_start", payload))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        event::{EventSummary, SubmitEventRequest, SubmitEventResponse},
        snapshot::{GameRecordView, SnapshotView},
    },
    error::AppError,
    services::{event_service, game_service},
    state::SharedState,
};

/// Routes for live scoring and for reading game state back.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/events", get(list_events).post(submit_event))
        .route("/games/{id}/snapshot", get(get_snapshot))
}

/// Submit one scoring event and return the snapshot it produced.
#[utoipa::path(
    post,
    path = "/games/{id}/events",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    request_body = SubmitEventRequest,
    responses(
        (status = 200, description = "Event applied", body = SubmitEventResponse),
        (status = 400, description = "Malformed or invalid event"),
        (status = 401, description = "Umpire is not assigned to the game"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Event not allowed in the current game state")
    )
)]
pub async fn submit_event(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitEventRequest>,
) -> Result<Json<SubmitEventResponse>, AppError> {
    payload.validate()?;
    let response = event_service::submit_event(&state, id, payload).await?;
    Ok(Json(response))
}

/// Full event log of the game in sequence order.
#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Event log", body = [EventSummary]),
        (status = 404, description = "Game not found")
    )
)]
pub async fn list_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    Ok(Json(game_service::list_events(&state, id).await?))
}

/// Current scoreboard of the game.
#[utoipa::path(
    get,
    path = "/games/{id}/snapshot",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Current snapshot", body = SnapshotView),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SnapshotView>, AppError> {
    Ok(Json(game_service::get_snapshot(&state, id).await?))
}

/// Parent game record with teams and final result.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = String, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game record", body = GameRecordView),
        (status = 404, description = "Game not found")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameRecordView>, AppError> {
    Ok(Json(game_service::get_game_record(&state, id).await?))
}

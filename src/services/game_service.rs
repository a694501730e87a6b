use crate::{
    dto::{
        event::EventSummary,
        snapshot::{GameRecordView, SnapshotView},
    },
    error::ServiceError,
    state::{SharedState, game::GameId},
};

/// Current scoreboard of a game.
pub async fn get_snapshot(state: &SharedState, game_id: GameId) -> Result<SnapshotView, ServiceError> {
    let Some(snapshot) = state.game_store().load_snapshot(game_id).await? else {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    };
    Ok((&snapshot).into())
}

/// Full event log of a game in sequence order, including undo and edit entries.
pub async fn list_events(
    state: &SharedState,
    game_id: GameId,
) -> Result<Vec<EventSummary>, ServiceError> {
    let store = state.game_store();
    if store.load_snapshot(game_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    }
    let events = store.list_events(game_id).await?;
    Ok(events.iter().map(EventSummary::from).collect())
}

/// Parent record written when the game starts and ends.
pub async fn get_game_record(
    state: &SharedState,
    game_id: GameId,
) -> Result<GameRecordView, ServiceError> {
    let Some(record) = state.game_store().find_game_record(game_id).await? else {
        return Err(ServiceError::NotFound(format!("game `{game_id}` not found")));
    };
    Ok(record.into())
}

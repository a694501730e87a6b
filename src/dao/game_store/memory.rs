//! Process-local [`GameStore`] backed by concurrent maps.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, ready};

use crate::{
    dao::{
        game_store::GameStore,
        models::GameRecordEntity,
        storage::{StorageError, StorageResult},
    },
    state::{
        events::GameEvent,
        game::{GameId, GameSnapshot},
    },
};

#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    snapshots: Arc<DashMap<GameId, GameSnapshot>>,
    events: Arc<DashMap<GameId, Vec<GameEvent>>>,
    records: Arc<DashMap<GameId, GameRecordEntity>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryGameStore {
    fn load_snapshot(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Option<GameSnapshot>>> {
        let snapshot = self.snapshots.get(&game_id).map(|entry| entry.value().clone());
        ready(Ok(snapshot)).boxed()
    }

    fn commit(
        &self,
        event: GameEvent,
        snapshot: GameSnapshot,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let mut log = self.events.entry(event.game_id).or_default();
        let last = log.last().map(|stored| stored.sequence_number);
        let result = match last {
            Some(last) if event.sequence_number <= last => Err(StorageError::conflict(format!(
                "game `{}` already has sequence number {last}, got {}",
                event.game_id, event.sequence_number
            ))),
            _ => {
                log.push(event);
                self.snapshots.insert(snapshot.game_id, snapshot);
                Ok(())
            }
        };
        ready(result).boxed()
    }

    fn list_events(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Vec<GameEvent>>> {
        let events = self
            .events
            .get(&game_id)
            .map(|log| log.value().clone())
            .unwrap_or_default();
        ready(Ok(events)).boxed()
    }

    fn recent_events(
        &self,
        game_id: GameId,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEvent>>> {
        let events = self
            .events
            .get(&game_id)
            .map(|log| {
                let start = log.len().saturating_sub(limit);
                log[start..].to_vec()
            })
            .unwrap_or_default();
        ready(Ok(events)).boxed()
    }

    fn find_game_record(
        &self,
        game_id: GameId,
    ) -> BoxFuture<'static, StorageResult<Option<GameRecordEntity>>> {
        let record = self.records.get(&game_id).map(|entry| entry.value().clone());
        ready(Ok(record)).boxed()
    }

    fn save_game_record(&self, record: GameRecordEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.records.insert(record.id, record);
        ready(Ok(())).boxed()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        ready(Ok(())).boxed()
    }
}

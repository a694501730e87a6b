pub mod memory;

use crate::dao::models::GameRecordEntity;
use crate::dao::storage::StorageResult;
use crate::state::{
    events::GameEvent,
    game::{GameId, GameSnapshot},
};
use futures::future::BoxFuture;

/// Key-value persistence of snapshots, event logs and parent game records.
pub trait GameStore: Send + Sync {
    fn load_snapshot(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Option<GameSnapshot>>>;
    /// Append `event` to the game's log and store `snapshot` as one write.
    ///
    /// Fails with a conflict, writing nothing, unless the event's sequence
    /// number is greater than every stored one.
    fn commit(
        &self,
        event: GameEvent,
        snapshot: GameSnapshot,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Full log of the game in sequence order.
    fn list_events(&self, game_id: GameId) -> BoxFuture<'static, StorageResult<Vec<GameEvent>>>;
    /// The last `limit` events of the game in sequence order.
    fn recent_events(
        &self,
        game_id: GameId,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEvent>>>;
    fn find_game_record(
        &self,
        game_id: GameId,
    ) -> BoxFuture<'static, StorageResult<Option<GameRecordEntity>>>;
    fn save_game_record(&self, record: GameRecordEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

pub mod base_running;
pub mod events;
pub mod game;
pub mod state_machine;

use std::{future::Future, sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::{Mutex, broadcast};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::game_store::GameStore,
    error::ServiceError,
    services::completion::GameCompleted,
    state::game::GameId,
};

pub use self::state_machine::{SideEffect, TransitionError, TransitionOutcome, transition};

pub type SharedState = Arc<AppState>;

/// Central application state: the game store, per-game transition gates and
/// the completion feed consumed by standings updaters.
pub struct AppState {
    game_store: Arc<dyn GameStore>,
    config: AppConfig,
    gates: DashMap<GameId, Arc<Mutex<()>>>,
    completions: broadcast::Sender<GameCompleted>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(game_store: Arc<dyn GameStore>, config: AppConfig) -> SharedState {
        let (completions, _rx) = broadcast::channel(config.completion_channel_capacity.max(1));
        Arc::new(Self {
            game_store,
            config,
            gates: DashMap::new(),
            completions,
        })
    }

    /// Handle to the installed game store.
    pub fn game_store(&self) -> Arc<dyn GameStore> {
        self.game_store.clone()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Subscribe to completed-game notifications.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<GameCompleted> {
        self.completions.subscribe()
    }

    /// Publish a completed game. Having no subscriber is not an error.
    pub fn publish_completion(&self, completed: GameCompleted) {
        if self.completions.send(completed).is_err() {
            warn!("no completion subscriber; standings will not be refreshed");
        }
    }

    fn gate(&self, game_id: GameId) -> Arc<Mutex<()>> {
        self.gates
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `prepare` then `commit` while holding the gate of `game_id`, so at
    /// most one transition per game is in flight.
    ///
    /// Only `prepare` is bounded by the transition timeout; once it has
    /// produced a value, `commit` runs to completion.
    pub async fn run_serialized<P, PFut, C, CFut, T, U>(
        &self,
        game_id: GameId,
        prepare: P,
        commit: C,
    ) -> Result<U, ServiceError>
    where
        P: FnOnce() -> PFut,
        PFut: Future<Output = Result<T, ServiceError>>,
        C: FnOnce(T) -> CFut,
        CFut: Future<Output = Result<U, ServiceError>>,
    {
        let gate = self.gate(game_id);
        let result = {
            let _guard = gate.lock().await;
            match self.bounded(game_id, prepare()).await {
                Ok(prepared) => commit(prepared).await,
                Err(err) => Err(err),
            }
        };
        drop(gate);
        // Gates only live while someone holds or waits on them.
        self.gates
            .remove_if(&game_id, |_, gate| Arc::strong_count(gate) == 1);
        result
    }

    async fn bounded<T>(
        &self,
        game_id: GameId,
        work: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match self.transition_timeout() {
            Some(limit) => match timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(%game_id, timeout_ms = limit.as_millis() as u64, "transition timed out");
                    Err(ServiceError::Timeout)
                }
            },
            None => work.await,
        }
    }

    fn transition_timeout(&self) -> Option<Duration> {
        match self.config.transition_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

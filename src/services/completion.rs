//! Completed-game notifications for standings and bracket updaters.

use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{info, warn};

use crate::state::game::{GameId, ScoringMethod};

/// Published once per game when its snapshot becomes completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCompleted {
    pub game_id: GameId,
    pub final_score_home: u32,
    pub final_score_away: u32,
    pub scoring_method: ScoringMethod,
}

/// Drain completion notifications until the channel closes.
pub async fn run_completion_logger(mut rx: Receiver<GameCompleted>) {
    loop {
        match rx.recv().await {
            Ok(completed) => info!(
                game_id = %completed.game_id,
                final_score_home = completed.final_score_home,
                final_score_away = completed.final_score_away,
                scoring_method = ?completed.scoring_method,
                "game completed; standings refresh due"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "completion feed lagged; some results were not observed")
            }
            Err(RecvError::Closed) => break,
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::state::game::{GameId, GameStatus, ScoringMethod, TeamId};

/// Parent game record, written by the side effects of `game_start` and `game_end`.
///
/// Snapshots and events live in their own keyspaces; this record is what
/// schedules, brackets and standings read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecordEntity {
    /// Primary key of the game.
    pub id: GameId,
    /// Home team, assigned when the game starts.
    pub home_team_id: Option<TeamId>,
    /// Away team, assigned when the game starts.
    pub away_team_id: Option<TeamId>,
    /// Last known lifecycle status.
    pub status: GameStatus,
    /// Final home score once completed.
    pub final_score_home: Option<u32>,
    /// Final away score once completed.
    pub final_score_away: Option<u32>,
    /// How the final score was obtained.
    pub scoring_method: Option<ScoringMethod>,
    /// Free-form notes attached to the final result.
    pub notes: Option<String>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the record was updated.
    pub updated_at: SystemTime,
}

impl GameRecordEntity {
    /// Fresh record for a game that has not started.
    pub fn new(id: GameId, now: SystemTime) -> Self {
        Self {
            id,
            home_team_id: None,
            away_team_id: None,
            status: GameStatus::NotStarted,
            final_score_home: None,
            final_score_away: None,
            scoring_method: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

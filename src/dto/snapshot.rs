use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::GameRecordEntity,
    dto::format_system_time,
    state::game::{BaseRunners, CupHit, GameSnapshot, GameStatus, ScoringMethod},
};

/// Occupied bases, `null` when empty.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BaseRunnersView {
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
}

impl From<&BaseRunners> for BaseRunnersView {
    fn from(runners: &BaseRunners) -> Self {
        Self {
            first: runners.first.clone(),
            second: runners.second.clone(),
            third: runners.third.clone(),
        }
    }
}

/// Live scoreboard of a game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnapshotView {
    pub game_id: Uuid,
    pub status: GameStatus,
    pub current_inning: u32,
    pub is_top_of_inning: bool,
    pub scheduled_innings: u32,
    pub outs: u8,
    pub balls: u8,
    pub strikes: u8,
    pub score_home: u32,
    pub score_away: u32,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub batter_id: Option<String>,
    pub catcher_id: Option<String>,
    pub base_runners: BaseRunnersView,
    pub home_lineup: Vec<String>,
    pub away_lineup: Vec<String>,
    pub home_lineup_position: usize,
    pub away_lineup_position: usize,
    pub umpire_id: Option<String>,
    /// Cup hit waiting for its flip cup.
    pub pending_cup_hit: Option<CupHit>,
    pub scoring_method: Option<ScoringMethod>,
    pub is_quick_result: bool,
    /// RFC 3339 time of the last applied event.
    pub last_updated: String,
}

impl From<&GameSnapshot> for SnapshotView {
    fn from(snapshot: &GameSnapshot) -> Self {
        Self {
            game_id: snapshot.game_id,
            status: snapshot.status,
            current_inning: snapshot.current_inning,
            is_top_of_inning: snapshot.is_top_of_inning,
            scheduled_innings: snapshot.scheduled_innings,
            outs: snapshot.outs,
            balls: snapshot.balls,
            strikes: snapshot.strikes,
            score_home: snapshot.score_home,
            score_away: snapshot.score_away,
            home_team_id: snapshot.home_team_id.clone(),
            away_team_id: snapshot.away_team_id.clone(),
            batter_id: snapshot.batter_id.clone(),
            catcher_id: snapshot.catcher_id.clone(),
            base_runners: (&snapshot.base_runners).into(),
            home_lineup: snapshot.home_lineup.clone(),
            away_lineup: snapshot.away_lineup.clone(),
            home_lineup_position: snapshot.home_lineup_position,
            away_lineup_position: snapshot.away_lineup_position,
            umpire_id: snapshot.umpire_id.clone(),
            pending_cup_hit: snapshot.pending_cup_hit,
            scoring_method: snapshot.scoring_method,
            is_quick_result: snapshot.is_quick_result,
            last_updated: format_system_time(snapshot.last_updated),
        }
    }
}

/// Parent game record as read by schedules and standings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameRecordView {
    pub id: Uuid,
    pub status: GameStatus,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub final_score_home: Option<u32>,
    pub final_score_away: Option<u32>,
    pub scoring_method: Option<ScoringMethod>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameRecordEntity> for GameRecordView {
    fn from(record: GameRecordEntity) -> Self {
        Self {
            id: record.id,
            status: record.status,
            home_team_id: record.home_team_id,
            away_team_id: record.away_team_id,
            final_score_home: record.final_score_home,
            final_score_away: record.final_score_away,
            scoring_method: record.scoring_method,
            notes: record.notes,
            created_at: format_system_time(record.created_at),
            updated_at: format_system_time(record.updated_at),
        }
    }
}

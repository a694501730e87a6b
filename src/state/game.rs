use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier of a single game.
pub type GameId = Uuid;
/// Opaque reference to a player taking part in a game.
pub type ParticipantId = String;
/// Opaque reference to a team.
pub type TeamId = String;
/// Opaque reference to the umpire allowed to submit events.
pub type UmpireId = String;

/// Number of innings scheduled when `game_start` does not say otherwise.
pub const DEFAULT_INNINGS: u32 = 7;

/// Lifecycle of a game. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Created but `game_start` has not been applied yet.
    NotStarted,
    /// Accepting gameplay events.
    InProgress,
    /// Frozen; every further event is rejected.
    Completed,
}

/// How the final score of a completed game was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Score accumulated by live scoring events.
    Live,
    /// Final score entered directly by the umpire.
    QuickResult,
}

/// Which team is currently at the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattingSide {
    /// Away team, bats in the top half.
    Away,
    /// Home team, bats in the bottom half.
    Home,
}

/// Stakes of a cup hit: how many bases the batter takes if offense wins the flip cup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CupHit {
    /// One base.
    First,
    /// Two bases.
    Second,
    /// Three bases.
    Third,
    /// Four bases, batter scores.
    Fourth,
}

impl CupHit {
    /// Bases awarded to the batter.
    pub fn bases(self) -> u8 {
        match self {
            CupHit::First => 1,
            CupHit::Second => 2,
            CupHit::Third => 3,
            CupHit::Fourth => 4,
        }
    }
}

/// Occupants of the three bases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRunners {
    /// Runner on first base.
    pub first: Option<ParticipantId>,
    /// Runner on second base.
    pub second: Option<ParticipantId>,
    /// Runner on third base.
    pub third: Option<ParticipantId>,
}

/// Complete state of one game at a point in time, replaced wholesale on each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Game this snapshot belongs to.
    pub game_id: GameId,
    /// Current inning, starting at 1.
    pub current_inning: u32,
    /// True while the away team bats.
    pub is_top_of_inning: bool,
    /// Outs in the current half inning, 0..=2 between events.
    pub outs: u8,
    /// Balls in the current count.
    pub balls: u8,
    /// Strikes in the current count.
    pub strikes: u8,
    /// Runs scored by the home team.
    pub score_home: u32,
    /// Runs scored by the away team.
    pub score_away: u32,
    /// Home team, set by `game_start`.
    pub home_team_id: Option<TeamId>,
    /// Away team, set by `game_start`.
    pub away_team_id: Option<TeamId>,
    /// Player at the plate.
    pub batter_id: Option<ParticipantId>,
    /// Player behind the plate.
    pub catcher_id: Option<ParticipantId>,
    /// Runners currently on base.
    pub base_runners: BaseRunners,
    /// Home batting order, fixed at game start.
    pub home_lineup: Vec<ParticipantId>,
    /// Away batting order, fixed at game start.
    pub away_lineup: Vec<ParticipantId>,
    /// Cursor into `home_lineup`.
    pub home_lineup_position: usize,
    /// Cursor into `away_lineup`.
    pub away_lineup_position: usize,
    /// Umpire allowed to submit events.
    pub umpire_id: Option<UmpireId>,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Set when the game completes.
    pub scoring_method: Option<ScoringMethod>,
    /// True when the game was completed by a quick result.
    pub is_quick_result: bool,
    /// Innings scheduled by `game_start`.
    pub scheduled_innings: u32,
    /// Cup hit awaiting its flip-cup contest.
    pub pending_cup_hit: Option<CupHit>,
    /// Creation time of the last applied event.
    pub last_updated: SystemTime,
}

impl GameSnapshot {
    /// Minimal snapshot for a game nobody has started yet.
    pub fn not_started(game_id: GameId) -> Self {
        Self {
            game_id,
            current_inning: 1,
            is_top_of_inning: true,
            outs: 0,
            balls: 0,
            strikes: 0,
            score_home: 0,
            score_away: 0,
            home_team_id: None,
            away_team_id: None,
            batter_id: None,
            catcher_id: None,
            base_runners: BaseRunners::default(),
            home_lineup: Vec::new(),
            away_lineup: Vec::new(),
            home_lineup_position: 0,
            away_lineup_position: 0,
            umpire_id: None,
            status: GameStatus::NotStarted,
            scoring_method: None,
            is_quick_result: false,
            scheduled_innings: DEFAULT_INNINGS,
            pending_cup_hit: None,
            last_updated: UNIX_EPOCH,
        }
    }

    /// Team at the plate, derived from the half inning.
    pub fn batting_side(&self) -> BattingSide {
        if self.is_top_of_inning {
            BattingSide::Away
        } else {
            BattingSide::Home
        }
    }

    /// Whether the game has reached its terminal status.
    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }

    /// Player the batting team's cursor currently points at.
    pub fn due_up(&self) -> Option<&ParticipantId> {
        match self.batting_side() {
            BattingSide::Away => self.away_lineup.get(self.away_lineup_position),
            BattingSide::Home => self.home_lineup.get(self.home_lineup_position),
        }
    }

    /// Credit runs to the batting team.
    pub(crate) fn add_runs(&mut self, runs: u32) {
        match self.batting_side() {
            BattingSide::Away => self.score_away = self.score_away.saturating_add(runs),
            BattingSide::Home => self.score_home = self.score_home.saturating_add(runs),
        }
    }

    /// Move the batting team's cursor to the next player, wrapping at the end
    /// of the lineup, and put that player at the plate.
    pub(crate) fn advance_lineup(&mut self) {
        let (lineup, position) = match self.batting_side() {
            BattingSide::Away => (&self.away_lineup, &mut self.away_lineup_position),
            BattingSide::Home => (&self.home_lineup, &mut self.home_lineup_position),
        };
        if lineup.is_empty() {
            return;
        }
        *position = (*position + 1) % lineup.len();
        self.batter_id = lineup.get(*position).cloned();
    }

    pub(crate) fn reset_count(&mut self) {
        self.balls = 0;
        self.strikes = 0;
    }

    /// Change sides once three outs are on the board.
    ///
    /// The inning number only moves when the bottom half ends.
    pub(crate) fn retire_side_if_three_outs(&mut self) {
        if self.outs < 3 {
            return;
        }

        self.outs = 0;
        self.base_runners = BaseRunners::default();
        self.pending_cup_hit = None;
        self.reset_count();
        if self.is_top_of_inning {
            self.is_top_of_inning = false;
        } else {
            self.is_top_of_inning = true;
            self.current_inning = self.current_inning.saturating_add(1);
        }
        self.batter_id = self.due_up().cloned();
    }
}

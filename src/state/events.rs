//! Scoring events fed to the state machine, one strict payload per event kind.

use std::{fmt, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use crate::state::game::{
    CupHit, DEFAULT_INNINGS, GameId, ParticipantId, ScoringMethod, TeamId, UmpireId,
};

/// Immutable, ordered input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Unique identifier of the event.
    pub id: Uuid,
    /// Game the event applies to.
    pub game_id: GameId,
    /// Umpire who submitted the event.
    pub umpire_id: UmpireId,
    /// Strictly increasing per game, assigned by the caller.
    pub sequence_number: u64,
    /// Submission time.
    pub created_at: SystemTime,
    /// Kind-specific content.
    #[serde(flatten)]
    pub body: EventBody,
}

/// Event content keyed by its wire `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventBody {
    /// A single pitch.
    Pitch(PitchPayload),
    /// The flip-cup contest that follows a cup hit.
    FlipCup(FlipCupPayload),
    /// Final outcome of a plate appearance.
    AtBat(AtBatPayload),
    /// Withdraw a previous gameplay event.
    Undo(UndoPayload),
    /// Replace a previous gameplay event.
    Edit(EditPayload),
    /// Hand the game over to another umpire.
    Takeover(TakeoverPayload),
    /// Start the game with its teams and lineups.
    GameStart(GameStartPayload),
    /// Finish the game with its final score.
    GameEnd(GameEndPayload),
}

/// Discriminant of [`EventBody`], matching the wire `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `pitch`
    Pitch,
    /// `flip_cup`
    FlipCup,
    /// `at_bat`
    AtBat,
    /// `undo`
    Undo,
    /// `edit`
    Edit,
    /// `takeover`
    Takeover,
    /// `game_start`
    GameStart,
    /// `game_end`
    GameEnd,
}

impl EventKind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Pitch => "pitch",
            EventKind::FlipCup => "flip_cup",
            EventKind::AtBat => "at_bat",
            EventKind::Undo => "undo",
            EventKind::Edit => "edit",
            EventKind::Takeover => "takeover",
            EventKind::GameStart => "game_start",
            EventKind::GameEnd => "game_end",
        }
    }

    /// Pitch, flip cup and at bat: the kinds that require a game in progress.
    pub fn is_gameplay(self) -> bool {
        matches!(self, EventKind::Pitch | EventKind::FlipCup | EventKind::AtBat)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventDecodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pitch" => Ok(EventKind::Pitch),
            "flip_cup" => Ok(EventKind::FlipCup),
            "at_bat" => Ok(EventKind::AtBat),
            "undo" => Ok(EventKind::Undo),
            "edit" => Ok(EventKind::Edit),
            "takeover" => Ok(EventKind::Takeover),
            "game_start" => Ok(EventKind::GameStart),
            "game_end" => Ok(EventKind::GameEnd),
            other => Err(EventDecodeError::UnrecognizedType(other.to_string())),
        }
    }
}

/// Failure to turn a raw `type` + `payload` pair into an [`EventBody`].
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The `type` is not one of the known event kinds.
    #[error("Unrecognized event type: {0}")]
    UnrecognizedType(String),
    /// The payload does not match the schema of its kind.
    #[error("invalid {kind} payload: {source}")]
    MalformedPayload {
        /// Kind whose payload failed to parse.
        kind: EventKind,
        /// Underlying serde failure.
        #[source]
        source: serde_json::Error,
    },
}

impl EventBody {
    /// Decode a wire `type` and its `payload`. A null payload is read as `{}`.
    pub fn decode(kind: &str, payload: Value) -> Result<Self, EventDecodeError> {
        let kind: EventKind = kind.parse()?;
        let payload = if payload.is_null() { json!({}) } else { payload };
        serde_json::from_value(json!({ "type": kind.as_str(), "payload": payload }))
            .map_err(|source| EventDecodeError::MalformedPayload { kind, source })
    }

    /// Kind of this body.
    pub fn kind(&self) -> EventKind {
        match self {
            EventBody::Pitch(_) => EventKind::Pitch,
            EventBody::FlipCup(_) => EventKind::FlipCup,
            EventBody::AtBat(_) => EventKind::AtBat,
            EventBody::Undo(_) => EventKind::Undo,
            EventBody::Edit(_) => EventKind::Edit,
            EventBody::Takeover(_) => EventKind::Takeover,
            EventBody::GameStart(_) => EventKind::GameStart,
            EventBody::GameEnd(_) => EventKind::GameEnd,
        }
    }

    /// The payload alone, as it appears on the wire.
    pub fn payload_value(&self) -> Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut value| value.get_mut("payload").map(Value::take))
            .unwrap_or(Value::Null)
    }
}

impl GameEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }
}

/// Outcome of a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PitchResult {
    #[serde(rename = "strike")]
    Strike,
    #[serde(rename = "foul ball")]
    FoulBall,
    #[serde(rename = "ball")]
    Ball,
    #[serde(rename = "first cup hit")]
    FirstCupHit,
    #[serde(rename = "second cup hit")]
    SecondCupHit,
    #[serde(rename = "third cup hit")]
    ThirdCupHit,
    #[serde(rename = "fourth cup hit")]
    FourthCupHit,
}

impl PitchResult {
    /// Cup hit signalled by this pitch, if any.
    pub fn cup_hit(self) -> Option<CupHit> {
        match self {
            PitchResult::FirstCupHit => Some(CupHit::First),
            PitchResult::SecondCupHit => Some(CupHit::Second),
            PitchResult::ThirdCupHit => Some(CupHit::Third),
            PitchResult::FourthCupHit => Some(CupHit::Fourth),
            PitchResult::Strike | PitchResult::FoulBall | PitchResult::Ball => None,
        }
    }
}

/// Payload of a `pitch` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchPayload {
    pub result: PitchResult,
    pub batter_id: ParticipantId,
    pub catcher_id: ParticipantId,
}

/// Winner of a flip-cup contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipCupResult {
    #[serde(rename = "offense wins")]
    OffenseWins,
    #[serde(rename = "defense wins")]
    DefenseWins,
}

/// Payload of a `flip_cup` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipCupPayload {
    pub result: FlipCupResult,
    pub batter_id: ParticipantId,
    pub catcher_id: ParticipantId,
    /// Fielding errors recorded during the contest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u32>,
}

/// Result of a plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtBatResult {
    Out,
    Walk,
    Single,
    Double,
    Triple,
    Homerun,
}

impl AtBatResult {
    /// Bases taken by the batter on a hit.
    pub fn hit_bases(self) -> Option<u8> {
        match self {
            AtBatResult::Single => Some(1),
            AtBatResult::Double => Some(2),
            AtBatResult::Triple => Some(3),
            AtBatResult::Homerun => Some(4),
            AtBatResult::Out | AtBatResult::Walk => None,
        }
    }
}

/// Payload of an `at_bat` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBatPayload {
    pub result: AtBatResult,
    pub batter_id: ParticipantId,
    pub catcher_id: ParticipantId,
}

/// Batting orders submitted with `game_start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineups {
    pub home: Vec<ParticipantId>,
    pub away: Vec<ParticipantId>,
}

/// Payload of a `game_start` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartPayload {
    pub umpire_id: UmpireId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub lineups: Lineups,
    #[serde(default = "default_innings")]
    pub innings: u32,
}

fn default_innings() -> u32 {
    DEFAULT_INNINGS
}

/// Payload of a `game_end` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEndPayload {
    pub final_score_home: u32,
    pub final_score_away: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_method: Option<ScoringMethod>,
}

/// Payload of a `takeover` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeoverPayload {
    pub new_umpire_id: UmpireId,
}

/// Payload of an `undo` event. Without a target the latest gameplay event is withdrawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_event_id: Option<Uuid>,
}

/// Payload of an `edit` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPayload {
    pub target_event_id: Uuid,
    pub replacement: GameplayBody,
}

/// Gameplay content an edit may substitute for the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameplayBody {
    Pitch(PitchPayload),
    FlipCup(FlipCupPayload),
    AtBat(AtBatPayload),
}

impl From<GameplayBody> for EventBody {
    fn from(value: GameplayBody) -> Self {
        match value {
            GameplayBody::Pitch(payload) => EventBody::Pitch(payload),
            GameplayBody::FlipCup(payload) => EventBody::FlipCup(payload),
            GameplayBody::AtBat(payload) => EventBody::AtBat(payload),
        }
    }
}

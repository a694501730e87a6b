use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, snapshot::SnapshotView, validation::validate_identifier},
    state::{events::GameEvent, game::GameSnapshot},
};

/// Scoring event submitted by an umpire.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitEventRequest {
    /// Event type: `pitch`, `flip_cup`, `at_bat`, `undo`, `edit`, `takeover`,
    /// `game_start` or `game_end`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific payload.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
    /// Umpire submitting the event.
    pub umpire_id: String,
}

impl Validate for SubmitEventRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_identifier(&self.kind) {
            errors.add("type", e);
        }
        if let Err(e) = validate_identifier(&self.umpire_id) {
            errors.add("umpire_id", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Stored event as exposed over HTTP.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventSummary {
    pub id: Uuid,
    pub game_id: Uuid,
    pub sequence_number: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(value_type = Object)]
    pub payload: Value,
    pub umpire_id: String,
    /// RFC 3339 submission time.
    pub created_at: String,
}

impl From<&GameEvent> for EventSummary {
    fn from(event: &GameEvent) -> Self {
        Self {
            id: event.id,
            game_id: event.game_id,
            sequence_number: event.sequence_number,
            kind: event.kind().to_string(),
            payload: event.body.payload_value(),
            umpire_id: event.umpire_id.clone(),
            created_at: format_system_time(event.created_at),
        }
    }
}

/// Accepted event together with the snapshot it produced.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmitEventResponse {
    pub event: EventSummary,
    pub snapshot: SnapshotView,
}

impl SubmitEventResponse {
    pub fn new(event: &GameEvent, snapshot: &GameSnapshot) -> Self {
        Self {
            event: event.into(),
            snapshot: snapshot.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use serde_json::json;

    use super::*;
    use crate::state::events::{EventBody, TakeoverPayload};

    #[test]
    fn request_reads_type_and_defaults_payload() {
        let request: SubmitEventRequest =
            serde_json::from_value(json!({ "type": "undo", "umpire_id": "ump" })).unwrap();
        assert_eq!(request.kind, "undo");
        assert_eq!(request.payload, Value::Null);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_umpire_is_rejected() {
        let request = SubmitEventRequest {
            kind: "pitch".into(),
            payload: json!({}),
            umpire_id: " ".into(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("umpire_id"));
    }

    #[test]
    fn summary_exposes_wire_type_and_payload() {
        let event = GameEvent {
            id: Uuid::nil(),
            game_id: Uuid::nil(),
            umpire_id: "ump".into(),
            sequence_number: 3,
            created_at: UNIX_EPOCH,
            body: EventBody::Takeover(TakeoverPayload {
                new_umpire_id: "relief".into(),
            }),
        };

        let value = serde_json::to_value(EventSummary::from(&event)).unwrap();

        assert_eq!(value["type"], "takeover");
        assert_eq!(value["payload"], json!({ "new_umpire_id": "relief" }));
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
    }
}

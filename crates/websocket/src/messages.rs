use serde::{Deserialize, Serialize};

use domain::models::public_state::PublicDraftState;
use domain::services::broadcaster::BroadcastEvent;

/// Wire shape pushed down the per-draft subscription channel. Mirrors
/// `BroadcastEvent` one-to-one; kept as a separate type so the wire
/// format (camelCase, explicit `type` tag) doesn't leak into the domain
/// crate's internal event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    State {
        #[serde(rename = "stateVersion")]
        state_version: i64,
        #[serde(rename = "publicState")]
        public_state: PublicDraftState,
    },
    Deleted,
    Pong,
    Error {
        message: String,
    },
}

impl From<BroadcastEvent> for ServerMessage {
    fn from(event: BroadcastEvent) -> Self {
        match event {
            BroadcastEvent::State { state_version, public_state } => ServerMessage::State {
                state_version,
                public_state,
            },
            BroadcastEvent::Deleted => ServerMessage::Deleted,
        }
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Messages a client may send over the subscription channel. Mutations
/// go through the REST API; the only thing worth sending here is a
/// keep-alive ping from clients whose proxy strips protocol-level pings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

impl ClientMessage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::draft::{DraftSettings, DraftStatus, PhaseState};
    use uuid::Uuid;

    fn sample_public_state() -> PublicDraftState {
        PublicDraftState {
            id: Uuid::new_v4(),
            share_id: "abc123".to_string(),
            host_seat_id: Uuid::new_v4(),
            set_code: "TST".to_string(),
            max_seats: 4,
            status: DraftStatus::Waiting,
            phase: PhaseState::Waiting,
            settings: DraftSettings::default(),
            paused: false,
            state_version: 1,
            seats: vec![],
        }
    }

    #[test]
    fn state_event_serializes_with_camel_case_fields() {
        let msg = ServerMessage::from(BroadcastEvent::State {
            state_version: 3,
            public_state: sample_public_state(),
        });
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"state\""));
        assert!(json.contains("\"stateVersion\":3"));
        assert!(json.contains("\"publicState\""));
    }

    #[test]
    fn deleted_event_serializes_to_bare_type_tag() {
        let msg = ServerMessage::from(BroadcastEvent::Deleted);
        let json = msg.to_json().unwrap();
        assert_eq!(json, "{\"type\":\"deleted\"}");
    }

    #[test]
    fn client_ping_round_trips() {
        let json = "{\"type\":\"ping\"}";
        assert_eq!(ClientMessage::from_json(json).unwrap(), ClientMessage::Ping);
    }
}

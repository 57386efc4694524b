//! Peer message definitions.

use serde::{Deserialize, Serialize};

use crate::errors::{ProtoError, Result};

/// A message between the two peers of a match.
///
/// Serialized with an `action` tag in snake case, for example
/// `{"action": "move", "player": 1, ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PeerMessage {
    /// Guest announces it has joined and is ready to play.
    PlayerReady {
        /// Display name of the guest.
        player_nick: String,
    },

    /// Host starts the match with the authoritative initial board.
    GameStart {
        /// The two seed numbers.
        active_numbers: Vec<u32>,
        /// Seat to move first.
        current_player: u8,
        /// Seat the host plays.
        host_player: u8,
        /// Seat the guest plays.
        guest_player: u8,
    },

    /// A move applied by the sender.
    Move {
        /// Seat that moved.
        player: u8,
        /// First operand.
        num1: u32,
        /// Second operand.
        num2: u32,
        /// Difference added to the board.
        diff: u32,
        /// Sender's board after the move, ascending.
        active_numbers: Vec<u32>,
    },

    /// The sender observed the end of the game.
    GameOver {
        /// Winning seat.
        winner: u8,
        /// Sender's final board, ascending.
        final_state: Vec<u32>,
    },

    /// Any action this build does not know.
    #[serde(other)]
    Unknown,
}

impl PeerMessage {
    /// Encode as CBOR.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|e| ProtoError::Encode { reason: e.to_string() })?;
        Ok(bytes)
    }

    /// Decode from CBOR.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        ciborium::de::from_reader(bytes).map_err(|e| ProtoError::Decode { reason: e.to_string() })
    }

    /// The `action` tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::PlayerReady { .. } => "player_ready",
            Self::GameStart { .. } => "game_start",
            Self::Move { .. } => "move",
            Self::GameOver { .. } => "game_over",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ciborium::Value;

    use super::*;

    fn encode_value(value: &Value) -> Vec<u8> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(value, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn move_round_trip() {
        let msg = PeerMessage::Move {
            player: 1,
            num1: 26,
            num2: 20,
            diff: 6,
            active_numbers: vec![6, 20, 26],
        };
        let bytes = msg.encode().unwrap();
        assert_eq!(PeerMessage::decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn tag_is_snake_case_action() {
        let bytes = PeerMessage::GameOver { winner: 2, final_state: vec![1, 2] }.encode().unwrap();
        let value: Value = ciborium::de::from_reader(&bytes[..]).unwrap();
        let action = value
            .as_map()
            .unwrap()
            .iter()
            .find(|(k, _)| k.as_text() == Some("action"))
            .and_then(|(_, v)| v.as_text().map(str::to_string));
        assert_eq!(action.as_deref(), Some("game_over"));
    }

    #[test]
    fn unknown_action_decodes_as_unknown() {
        let bytes = encode_value(&Value::Map(vec![
            (Value::Text("action".into()), Value::Text("chat".into())),
            (Value::Text("text".into()), Value::Text("hi".into())),
        ]));
        assert_eq!(PeerMessage::decode(&bytes).unwrap(), PeerMessage::Unknown);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let bytes = encode_value(&Value::Map(vec![
            (Value::Text("action".into()), Value::Text("player_ready".into())),
            (Value::Text("player_nick".into()), Value::Text("ada".into())),
            (Value::Text("colour".into()), Value::Text("blue".into())),
        ]));
        assert_eq!(
            PeerMessage::decode(&bytes).unwrap(),
            PeerMessage::PlayerReady { player_nick: "ada".into() }
        );
    }

    #[test]
    fn missing_tag_is_an_error() {
        let bytes = encode_value(&Value::Map(vec![(
            Value::Text("player_nick".into()),
            Value::Text("ada".into()),
        )]));
        assert!(matches!(PeerMessage::decode(&bytes), Err(ProtoError::Decode { .. })));
    }
}

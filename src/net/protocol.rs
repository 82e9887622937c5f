//! Host/peer wire messages
//!
//! Every message is a self-contained snapshot: applying one never depends on
//! an earlier one having arrived, and applying it twice is harmless. Payloads
//! are JSON objects tagged by `type`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{Direction, PeerInput, Position, Role, on_grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkMessage {
    /// Host -> peer, once per game before the tick loop
    Start {
        peer_role: Role,
        map_index: u8,
        start_timestamp: u64,
    },
    /// Host -> peer, periodic authoritative snapshot
    State {
        host_pos: Position,
        peer_pos: Position,
        role_for_peer: Role,
        map_index: u8,
        remaining_ms: u64,
    },
    /// Peer -> host, every peer tick
    Input {
        direction: Option<Direction>,
        red_pressed_count: u32,
        blue_pressed_count: u32,
    },
    /// Host -> peer, once when the game ends
    GameOver { peer_won: bool },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

impl NetworkMessage {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }

    /// Wire discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkMessage::Start { .. } => "start",
            NetworkMessage::State { .. } => "state",
            NetworkMessage::Input { .. } => "input",
            NetworkMessage::GameOver { .. } => "game_over",
        }
    }

    /// Snapshot positions must lie on the grid
    pub fn is_well_formed(&self) -> bool {
        match *self {
            NetworkMessage::State {
                host_pos, peer_pos, ..
            } => on_grid(host_pos) && on_grid(peer_pos),
            _ => true,
        }
    }

    /// The peer-input part of an `Input` message
    pub fn as_peer_input(&self) -> Option<PeerInput> {
        match *self {
            NetworkMessage::Input {
                direction,
                red_pressed_count,
                blue_pressed_count,
            } => Some(PeerInput {
                direction,
                red_pressed_count,
                blue_pressed_count,
            }),
            _ => None,
        }
    }
}

impl From<PeerInput> for NetworkMessage {
    fn from(input: PeerInput) -> Self {
        NetworkMessage::Input {
            direction: input.direction,
            red_pressed_count: input.red_pressed_count,
            blue_pressed_count: input.blue_pressed_count,
        }
    }
}

//! Host broadcasting and peer-side reconciliation
//!
//! Host and peer keep independent replicas of the game. The host's copy is
//! authoritative; the peer converges by overwriting its copy with each
//! snapshot it happens to receive. Nothing is acknowledged or retried: the
//! next periodic send supersedes anything lost.

use super::protocol::NetworkMessage;
use super::transport::Transport;
use crate::consts::{GAME_DURATION_MS, STATE_BROADCAST_INTERVAL_MS};
use crate::sim::{GameSession, HOST_START, PEER_START, PeerInput, Position, Role};

/// Counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u32,
    pub send_failures: u32,
    pub received: u32,
    pub discarded: u32,
}

/// Message-level wrapper over a transport. Swallows every failure.
pub struct MessageLink<T: Transport> {
    transport: T,
    stats: LinkStats,
}

impl<T: Transport> MessageLink<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            stats: LinkStats::default(),
        }
    }

    /// Best-effort send; returns whether the transport accepted it
    pub fn send(&mut self, message: &NetworkMessage) -> bool {
        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("Dropping {} message: {}", message.kind(), e);
                self.stats.send_failures += 1;
                return false;
            }
        };
        match self.transport.send(&bytes) {
            Ok(()) => {
                log::trace!("Sent {} ({} bytes)", message.kind(), bytes.len());
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                log::debug!("Send of {} failed: {}", message.kind(), e);
                self.stats.send_failures += 1;
                false
            }
        }
    }

    /// Take at most one datagram off the link. Undecodable payloads and
    /// snapshots with off-grid positions are dropped and read as "nothing
    /// arrived".
    pub fn poll(&mut self) -> Option<NetworkMessage> {
        let bytes = self.transport.try_receive()?;
        match NetworkMessage::decode(&bytes) {
            Ok(message) if !message.is_well_formed() => {
                log::debug!("Discarding {} with off-grid positions", message.kind());
                self.stats.discarded += 1;
                None
            }
            Ok(message) => {
                self.stats.received += 1;
                Some(message)
            }
            Err(e) => {
                log::debug!("Discarding {} byte payload: {}", bytes.len(), e);
                self.stats.discarded += 1;
                None
            }
        }
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Host side of the protocol
pub struct HostSync<T: Transport> {
    link: MessageLink<T>,
    last_state_ms: Option<u64>,
}

impl<T: Transport> HostSync<T> {
    pub fn new(transport: T) -> Self {
        Self {
            link: MessageLink::new(transport),
            last_state_ms: None,
        }
    }

    /// Forget the previous game's broadcast cadence
    pub fn reset(&mut self) {
        self.last_state_ms = None;
    }

    pub fn broadcast_start(&mut self, map_index: u8, peer_role: Role, start_timestamp: u64) {
        log::info!(
            "Broadcasting start: map {} peer plays {}",
            map_index,
            peer_role.as_str()
        );
        self.link.send(&NetworkMessage::Start {
            peer_role,
            map_index,
            start_timestamp,
        });
    }

    /// Send a snapshot unless one went out less than 150 ms ago.
    /// Returns whether a send was attempted.
    pub fn broadcast_state(&mut self, now: u64, session: &GameSession) -> bool {
        if let Some(last) = self.last_state_ms {
            if now.saturating_sub(last) < STATE_BROADCAST_INTERVAL_MS {
                return false;
            }
        }
        self.last_state_ms = Some(now);
        self.link.send(&state_snapshot(session, now));
        true
    }

    /// Snapshot of the decided game, sent regardless of cadence so the peer
    /// sees the final positions even if `game_over` is lost
    pub fn broadcast_final_state(&mut self, now: u64, session: &GameSession) {
        self.last_state_ms = Some(now);
        self.link.send(&state_snapshot(session, now));
    }

    pub fn broadcast_game_over(&mut self, peer_won: bool) {
        log::info!("Broadcasting game over (peer won: {})", peer_won);
        self.link.send(&NetworkMessage::GameOver { peer_won });
    }

    /// Ingest at most one buffered message; only peer input matters to the host.
    pub fn poll_peer_input(&mut self) -> Option<PeerInput> {
        let message = self.link.poll()?;
        let input = message.as_peer_input();
        if input.is_none() {
            log::debug!("Host ignoring {} message", message.kind());
        }
        input
    }

    pub fn link(&self) -> &MessageLink<T> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut MessageLink<T> {
        &mut self.link
    }
}

/// Authoritative snapshot of a session for the peer
pub fn state_snapshot(session: &GameSession, now: u64) -> NetworkMessage {
    NetworkMessage::State {
        host_pos: session.host.pos,
        peer_pos: session.peer.pos,
        role_for_peer: session.peer_role(),
        map_index: session.maze.index() as u8,
        remaining_ms: session.clock.remaining(now),
    }
}

/// What applying a message did to the replica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaEvent {
    /// A new game began
    Started,
    /// Snapshot applied
    Updated,
    /// Host decided the game; `true` if this peer won
    Ended(bool),
    /// Not meant for the peer
    Ignored,
}

/// The peer's copy of the game, rebuilt purely from host snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerReplica {
    pub role: Role,
    pub map_index: u8,
    pub host_pos: Position,
    pub peer_pos: Position,
    pub remaining_ms: u64,
    /// Set by `game_over`
    pub peer_won: Option<bool>,
}

impl PeerReplica {
    pub fn new(role: Role, map_index: u8) -> Self {
        Self {
            role,
            map_index,
            host_pos: HOST_START,
            peer_pos: PEER_START,
            remaining_ms: GAME_DURATION_MS,
            peer_won: None,
        }
    }

    /// Build a replica from a `start` message
    pub fn from_start(message: &NetworkMessage) -> Option<Self> {
        match *message {
            NetworkMessage::Start {
                peer_role,
                map_index,
                ..
            } => Some(Self::new(peer_role, map_index)),
            _ => None,
        }
    }

    /// Apply a host message. Snapshots are assignments, never deltas.
    pub fn apply(&mut self, message: &NetworkMessage) -> ReplicaEvent {
        match *message {
            NetworkMessage::Start {
                peer_role,
                map_index,
                ..
            } => {
                *self = Self::new(peer_role, map_index);
                ReplicaEvent::Started
            }
            NetworkMessage::State {
                host_pos,
                peer_pos,
                role_for_peer,
                map_index,
                remaining_ms,
            } => {
                self.host_pos = host_pos;
                self.peer_pos = peer_pos;
                self.role = role_for_peer;
                self.map_index = map_index;
                self.remaining_ms = remaining_ms;
                ReplicaEvent::Updated
            }
            NetworkMessage::GameOver { peer_won } => {
                self.peer_won = Some(peer_won);
                ReplicaEvent::Ended(peer_won)
            }
            NetworkMessage::Input { .. } => ReplicaEvent::Ignored,
        }
    }
}

//! Game state and core simulation types
//!
//! Everything here belongs to exactly one game: a fresh `GameSession` is
//! built at role assignment and dropped when the game ends.

use serde::{Deserialize, Serialize};

use super::input::Direction;
use super::maze::MazeMap;
use super::motion::{MoveThrottle, Position};
use super::powerup::PowerUpTracker;
use crate::consts::GAME_DURATION_MS;

/// Host player's starting cell
pub const HOST_START: Position = Position::new(7, 7);
/// Peer player's starting cell
pub const PEER_START: Position = Position::new(0, 0);

/// The two complementary roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Chaser,
    Runner,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Role::Chaser => Role::Runner,
            Role::Runner => Role::Chaser,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Chaser => "Chaser",
            Role::Runner => "Runner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chaser" => Some(Role::Chaser),
            "runner" => Some(Role::Runner),
            _ => None,
        }
    }
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Both players reached the same cell
    Captured,
    /// The clock ran out first
    TimedOut,
}

impl Outcome {
    /// Capture wins for the Chaser; timeout wins for the Runner.
    pub fn is_win_for(self, role: Role) -> bool {
        match (role, self) {
            (Role::Chaser, Outcome::Captured) => true,
            (Role::Chaser, Outcome::TimedOut) => false,
            (Role::Runner, Outcome::Captured) => false,
            (Role::Runner, Outcome::TimedOut) => true,
        }
    }
}

/// Fixed-length game clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl SessionClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            start_ms,
            duration_ms: GAME_DURATION_MS,
        }
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.start_ms)
    }

    pub fn remaining(&self, now: u64) -> u64 {
        self.duration_ms.saturating_sub(self.elapsed(now))
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.elapsed(now) >= self.duration_ms
    }
}

/// Whether the other token is driven by a peer device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimMode {
    /// Single device; the opponent token never moves
    Standalone,
    /// Peer input moves the opponent; boosted steps stack
    Networked,
}

/// A player steered by this device's joystick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPlayer {
    pub pos: Position,
    pub throttle: MoveThrottle,
    pub powerups: PowerUpTracker,
}

impl LocalPlayer {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            throttle: MoveThrottle::default(),
            powerups: PowerUpTracker::default(),
        }
    }
}

/// The peer's player as the host simulates it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemotePlayer {
    pub pos: Position,
    pub throttle: MoveThrottle,
    /// Last direction reported by the peer; reused until a newer input arrives
    pub direction: Option<Direction>,
    /// Cumulative press counts reported by the peer (informational)
    pub red_pressed_count: u32,
    pub blue_pressed_count: u32,
}

impl RemotePlayer {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            throttle: MoveThrottle::default(),
            direction: None,
            red_pressed_count: 0,
            blue_pressed_count: 0,
        }
    }
}

/// Authoritative state of one game on the host
#[derive(Debug, Clone)]
pub struct GameSession {
    pub mode: SimMode,
    /// Role of the player on this (host) device
    pub host_role: Role,
    pub maze: MazeMap,
    pub clock: SessionClock,
    pub host: LocalPlayer,
    pub peer: RemotePlayer,
    /// Set once, when the game ends
    pub outcome: Option<Outcome>,
}

impl GameSession {
    pub fn new(mode: SimMode, host_role: Role, maze: MazeMap, start_ms: u64) -> Self {
        Self {
            mode,
            host_role,
            maze,
            clock: SessionClock::new(start_ms),
            host: LocalPlayer::new(HOST_START),
            peer: RemotePlayer::new(PEER_START),
            outcome: None,
        }
    }

    pub fn peer_role(&self) -> Role {
        self.host_role.opposite()
    }

    pub fn is_networked(&self) -> bool {
        self.mode == SimMode::Networked
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn host_won(&self) -> Option<bool> {
        self.outcome.map(|o| o.is_win_for(self.host_role))
    }

    pub fn peer_won(&self) -> Option<bool> {
        self.outcome.map(|o| o.is_win_for(self.peer_role()))
    }
}

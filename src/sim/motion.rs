//! Grid movement against maze walls

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::input::Direction;
use super::maze::MazeMap;
use crate::consts::{GRID_SIZE, MOVE_DELAY_MS, SPEED_BOOST_DELAY_MS};

/// A cell on the 8x8 grid
pub type Position = IVec2;

pub fn on_grid(position: Position) -> bool {
    (0..GRID_SIZE).contains(&position.x) && (0..GRID_SIZE).contains(&position.y)
}

/// Move one cell, or stay put if the destination is a wall or off-grid.
pub fn try_move(position: Position, direction: Direction, maze: &MazeMap) -> Position {
    let candidate = position + direction.delta();
    if maze.is_wall(candidate.x, candidate.y) {
        position
    } else {
        candidate
    }
}

/// Minimum interval between move attempts for the current boost state
pub fn move_delay(boosted: bool) -> u64 {
    if boosted {
        SPEED_BOOST_DELAY_MS
    } else {
        MOVE_DELAY_MS
    }
}

/// Per-player rate limit. Every attempt resets the timer, whether or not the
/// move was blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveThrottle {
    last_attempt: Option<u64>,
}

impl MoveThrottle {
    pub fn ready(&self, now: u64, delay: u64) -> bool {
        self.last_attempt
            .is_none_or(|last| now.saturating_sub(last) >= delay)
    }

    pub fn mark(&mut self, now: u64) {
        self.last_attempt = Some(now);
    }

    pub fn last_attempt(&self) -> Option<u64> {
        self.last_attempt
    }
}

/// How a single player's step is resolved this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRules {
    /// Speed boost active (shorter delay)
    pub boosted: bool,
    /// Take a second, ungated step after a successful boosted step
    pub double_step: bool,
}

impl StepRules {
    /// Unboosted, single step at the base delay
    pub const BASE: StepRules = StepRules {
        boosted: false,
        double_step: false,
    };
}

/// Throttled move for one player.
///
/// With no direction nothing happens and the throttle is left alone.
pub fn step(
    position: Position,
    direction: Option<Direction>,
    throttle: &mut MoveThrottle,
    rules: StepRules,
    now: u64,
    maze: &MazeMap,
) -> Position {
    let Some(direction) = direction else {
        return position;
    };
    if !throttle.ready(now, move_delay(rules.boosted)) {
        return position;
    }
    throttle.mark(now);

    let moved = try_move(position, direction, maze);
    if rules.boosted && rules.double_step && moved != position {
        try_move(moved, direction, maze)
    } else {
        moved
    }
}

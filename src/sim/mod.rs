//! Game rules
//!
//! Everything here is hardware-free and driven by explicit timestamps:
//! - Millisecond timestamps passed in, never read from a clock
//! - Movement throttled per player
//! - No rendering or network dependencies

pub mod input;
pub mod maze;
pub mod motion;
pub mod powerup;
pub mod state;
pub mod tick;

pub use input::{AxisCalibration, ButtonEdges, Direction, EdgeDetector, InputSampler};
pub use maze::{MAZE_CATALOG, MazeMap};
pub use motion::{MoveThrottle, Position, StepRules, move_delay, on_grid, step, try_move};
pub use powerup::{PowerUp, PowerUpKind, PowerUpTracker};
pub use state::{
    GameSession, HOST_START, LocalPlayer, Outcome, PEER_START, RemotePlayer, Role, SessionClock,
    SimMode,
};
pub use tick::{PeerInput, TickInput, tick};

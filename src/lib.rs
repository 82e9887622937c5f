//! Maze Tag - two-player chase/tag on an 8x8 LED maze
//!
//! Core modules:
//! - `sim`: Game rules (maze, input sampling, power-ups, movement, tick)
//! - `net`: Host/peer wire protocol and snapshot reconciliation
//! - `session`: Per-device state machine (role assignment through restart)
//! - `renderer`: LED matrix drawing
//! - `platform`: Clock and input hardware abstraction
//! - `audio`: Track playback cues
//! - `settings`: Device configuration

pub mod audio;
pub mod net;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use settings::{PlayMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Matrix is square, cells are addressed 0..GRID_SIZE on both axes
    pub const GRID_SIZE: i32 = 8;

    /// Length of one game (2 minutes)
    pub const GAME_DURATION_MS: u64 = 120_000;
    /// Scheduling quantum of the active loop
    pub const TICK_PERIOD_MS: u64 = 20;

    /// Minimum time between move attempts
    pub const MOVE_DELAY_MS: u64 = 120;
    /// Minimum time between move attempts while speed boost is active
    pub const SPEED_BOOST_DELAY_MS: u64 = 70;

    /// Power-up duration per activation
    pub const POWERUP_DURATION_MS: u64 = 3_000;
    /// Activations per power-up kind per game
    pub const POWERUP_USES: u8 = 2;

    /// Host state broadcast cadence
    pub const STATE_BROADCAST_INTERVAL_MS: u64 = 150;

    /// Both buttons must be held this long to start a new game
    pub const RESTART_HOLD_MS: u64 = 3_000;
    /// Poll period of the restart gate
    pub const RESTART_POLL_MS: u64 = 50;

    /// Pause before each track change so the player settles
    pub const AUDIO_SETTLE_MS: u64 = 100;
    /// Delay between cells of the closing spiral
    pub const SPIRAL_STEP_MS: u64 = 30;
    /// Blank pause before the result text
    pub const RESULT_BLANK_MS: u64 = 200;
    /// Hold after the result text
    pub const RESULT_HOLD_MS: u64 = 800;
}

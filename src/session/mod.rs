//! Per-device game lifecycle
//!
//! Each device runs an endless cycle of games:
//! `RoleAssignment -> Presenting -> Active -> Ending -> RestartGate -> RoleAssignment`.
//! The host (or a standalone device) owns the authoritative simulation; a
//! peer device follows the host's snapshots and only contributes input.

pub mod host;
pub mod peer;

pub use host::{GameReport, HostDevice};
pub use peer::{PeerDevice, PeerReport};

use crate::audio::{AudioManager, AudioPlayer};
use crate::consts::{RESTART_HOLD_MS, RESTART_POLL_MS};
use crate::platform::{ButtonLevels, Clock, InputDevice};
use crate::renderer::{Display, text};

/// Lifecycle phase of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Pick roles and maze, reset per-game state
    RoleAssignment,
    /// Announce role and timer, start music, send `start`
    Presenting,
    /// Tick loop
    Active,
    /// Closing flourish and result
    Ending,
    /// Wait for both buttons held
    RestartGate,
}

/// The hardware a device drives
pub struct Console<D: Display, A: AudioPlayer, I: InputDevice, C: Clock> {
    pub display: D,
    pub audio: AudioManager<A>,
    pub input: I,
    pub clock: C,
}

impl<D: Display, A: AudioPlayer, I: InputDevice, C: Clock> Console<D, A, I, C> {
    pub fn new(display: D, audio: AudioManager<A>, input: I, clock: C) -> Self {
        Self {
            display,
            audio,
            input,
            clock,
        }
    }
}

/// Both buttons must stay down for a continuous 3 s; any release starts over.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestartGate {
    held_since: Option<u64>,
}

impl RestartGate {
    /// Feed one button sample. Returns true once the hold is long enough.
    pub fn update(&mut self, now: u64, levels: ButtonLevels) -> bool {
        if !levels.both_pressed() {
            self.held_since = None;
            return false;
        }
        let since = *self.held_since.get_or_insert(now);
        now - since >= RESTART_HOLD_MS
    }
}

/// Show the restart prompt and block until the hold completes
pub fn wait_for_restart<D, A, I, C>(console: &mut Console<D, A, I, C>)
where
    D: Display,
    A: AudioPlayer,
    I: InputDevice,
    C: Clock,
{
    console.display.clear();
    console.display.present();
    console.display.draw_scrolling_text(text::HOLD_BOTH);
    console.display.draw_scrolling_text(text::HOLD_3S);

    let mut gate = RestartGate::default();
    loop {
        let levels = console.input.read_buttons();
        if gate.update(console.clock.now_ms(), levels) {
            log::info!("Restart requested");
            return;
        }
        console.clock.sleep_ms(RESTART_POLL_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Level;

    const BOTH: ButtonLevels = ButtonLevels {
        red: Level::Low,
        blue: Level::Low,
    };
    const RED_ONLY: ButtonLevels = ButtonLevels {
        red: Level::Low,
        blue: Level::High,
    };

    #[test]
    fn test_gate_needs_continuous_hold() {
        let mut gate = RestartGate::default();
        assert!(!gate.update(0, BOTH));
        assert!(!gate.update(2_999, BOTH));
        assert!(gate.update(3_000, BOTH));
    }

    #[test]
    fn test_release_resets_hold() {
        let mut gate = RestartGate::default();
        gate.update(0, BOTH);
        gate.update(2_500, BOTH);
        assert!(!gate.update(2_550, RED_ONLY));
        // The earlier 2.5 s no longer counts
        assert!(!gate.update(3_100, BOTH));
        assert!(!gate.update(2_600 + RESTART_HOLD_MS, BOTH));
        assert!(gate.update(3_100 + RESTART_HOLD_MS, BOTH));
    }
}

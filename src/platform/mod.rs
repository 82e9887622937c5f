//! Platform abstraction layer
//!
//! Handles hardware differences for:
//! - Time/ticks (`Clock`)
//! - Joystick and buttons (`InputDevice`)

pub mod demo;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub use demo::DemoJoystick;

/// Monotonic millisecond clock plus the loop's only suspension primitive
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
    /// Suspend the loop for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u64);
}

/// Digital pin level. Buttons are wired active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    High,
    Low,
}

impl Level {
    pub fn is_pressed(self) -> bool {
        self == Level::Low
    }
}

/// Snapshot of both button pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonLevels {
    pub red: Level,
    pub blue: Level,
}

impl ButtonLevels {
    pub fn both_pressed(&self) -> bool {
        self.red.is_pressed() && self.blue.is_pressed()
    }
}

/// Joystick + two buttons
pub trait InputDevice {
    /// Raw ADC readings for the X and Y axes
    fn read_axes(&mut self) -> (i32, i32);
    /// Current (debounced) button pin levels
    fn read_buttons(&mut self) -> ButtonLevels;
}

/// Wall-clock time for native builds
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Simulated time: sleeping advances the clock instantly.
///
/// Clones share the same timeline, so a test can keep a handle and
/// inspect or advance time while a session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_timeline() {
        let handle = ManualClock::new(1_000);
        let mut owned = handle.clone();
        owned.sleep_ms(20);
        assert_eq!(handle.now_ms(), 1_020);
        handle.advance(5);
        assert_eq!(owned.now_ms(), 1_025);
    }

    #[test]
    fn test_active_low_buttons() {
        let levels = ButtonLevels {
            red: Level::Low,
            blue: Level::High,
        };
        assert!(levels.red.is_pressed());
        assert!(!levels.both_pressed());
    }
}

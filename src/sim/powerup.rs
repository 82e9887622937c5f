//! Limited-use timed power-ups
//!
//! Red button: invisibility (own token not drawn). Blue button: speed boost
//! (shorter move delay, plus a double step in networked play). Each kind
//! has two activations per game. Neither affects collision or capture.

use serde::{Deserialize, Serialize};

use crate::consts::{POWERUP_DURATION_MS, POWERUP_USES};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invisibility,
    SpeedBoost,
}

/// One power-up's remaining budget and expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub uses_remaining: u8,
    pub active_until: Option<u64>,
}

impl Default for PowerUp {
    fn default() -> Self {
        Self {
            uses_remaining: POWERUP_USES,
            active_until: None,
        }
    }
}

impl PowerUp {
    /// Spend one use. Returns false (and changes nothing) once the budget is gone.
    pub fn trigger(&mut self, now: u64) -> bool {
        if self.uses_remaining == 0 {
            return false;
        }
        self.uses_remaining -= 1;
        self.active_until = Some(now + POWERUP_DURATION_MS);
        true
    }

    pub fn is_active(&self, now: u64) -> bool {
        self.active_until.is_some_and(|until| now < until)
    }
}

/// Both power-ups for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpTracker {
    pub invisibility: PowerUp,
    pub speed_boost: PowerUp,
}

impl PowerUpTracker {
    pub fn on_red_edge(&mut self, now: u64) -> bool {
        let accepted = self.invisibility.trigger(now);
        if accepted {
            log::debug!(
                "Invisibility on until {} ({} left)",
                now + POWERUP_DURATION_MS,
                self.invisibility.uses_remaining
            );
        }
        accepted
    }

    pub fn on_blue_edge(&mut self, now: u64) -> bool {
        let accepted = self.speed_boost.trigger(now);
        if accepted {
            log::debug!(
                "Speed boost on until {} ({} left)",
                now + POWERUP_DURATION_MS,
                self.speed_boost.uses_remaining
            );
        }
        accepted
    }

    pub fn is_invisible(&self, now: u64) -> bool {
        self.invisibility.is_active(now)
    }

    pub fn is_speed_boosted(&self, now: u64) -> bool {
        self.speed_boost.is_active(now)
    }

    pub fn get(&self, kind: PowerUpKind) -> &PowerUp {
        match kind {
            PowerUpKind::Invisibility => &self.invisibility,
            PowerUpKind::SpeedBoost => &self.speed_boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_active_window() {
        let mut tracker = PowerUpTracker::default();
        assert!(!tracker.is_invisible(0));
        assert!(tracker.on_red_edge(1_000));
        assert!(tracker.is_invisible(1_000));
        assert!(tracker.is_invisible(3_999));
        assert!(!tracker.is_invisible(4_000));
        assert!(!tracker.is_speed_boosted(2_000));
    }

    #[test]
    fn test_rapid_third_edge_is_ignored() {
        // Two presses 50 ms apart, then a third 10 ms later
        let mut tracker = PowerUpTracker::default();
        assert!(tracker.on_red_edge(5_000));
        assert!(tracker.on_red_edge(5_050));
        assert!(!tracker.on_red_edge(5_060));

        let invis = tracker.get(PowerUpKind::Invisibility);
        assert_eq!(invis.uses_remaining, 0);
        assert_eq!(invis.active_until, Some(5_050 + POWERUP_DURATION_MS));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut tracker = PowerUpTracker::default();
        tracker.on_blue_edge(0);
        tracker.on_blue_edge(10);
        assert!(!tracker.on_blue_edge(20));
        assert!(tracker.on_red_edge(20));
        assert_eq!(tracker.invisibility.uses_remaining, 1);
    }

    proptest! {
        #[test]
        fn prop_budget_exhausted_after_two(
            first in 0u64..100_000,
            gap in 0u64..10_000,
            later in 0u64..1_000_000,
        ) {
            let mut power = PowerUp::default();
            power.trigger(first);
            power.trigger(first + gap);
            let before = power;
            prop_assert!(!power.trigger(first + gap + later));
            prop_assert_eq!(power, before);
            prop_assert_eq!(power.uses_remaining, 0);
        }
    }
}

//! Random-walk joystick for running the game without hardware

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{ButtonLevels, InputDevice, Level};

/// Reads per cycle of the "hold both buttons" pattern
const HOLD_CYCLE_READS: u64 = 9_000;
/// Reads at the end of each cycle with both buttons held
const HOLD_READS: u64 = 250;
/// ADC swing applied around center when pushing the stick
const DEFLECTION: i32 = 1_200;

/// Wanders the stick, occasionally taps a button, and periodically holds
/// both buttons long enough to pass the restart gate.
#[derive(Debug)]
pub struct DemoJoystick {
    rng: Pcg32,
    center: (i32, i32),
    deflection: (i32, i32),
    hold_reads_left: u32,
    tap_reads_left: (u32, u32),
    button_reads: u64,
}

impl DemoJoystick {
    pub fn new(seed: u64, center_x: i32, center_y: i32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            center: (center_x, center_y),
            deflection: (0, 0),
            hold_reads_left: 0,
            tap_reads_left: (0, 0),
            button_reads: 0,
        }
    }

    fn pick_deflection(&mut self) {
        self.deflection = match self.rng.random_range(0..5) {
            0 => (DEFLECTION, 0),
            1 => (-DEFLECTION, 0),
            2 => (0, DEFLECTION),
            3 => (0, -DEFLECTION),
            _ => (0, 0),
        };
        self.hold_reads_left = self.rng.random_range(5..40);
    }
}

impl InputDevice for DemoJoystick {
    fn read_axes(&mut self) -> (i32, i32) {
        if self.hold_reads_left == 0 {
            self.pick_deflection();
        }
        self.hold_reads_left -= 1;
        (
            self.center.0 + self.deflection.0,
            self.center.1 + self.deflection.1,
        )
    }

    fn read_buttons(&mut self) -> ButtonLevels {
        self.button_reads += 1;
        if self.button_reads % HOLD_CYCLE_READS >= HOLD_CYCLE_READS - HOLD_READS {
            return ButtonLevels {
                red: Level::Low,
                blue: Level::Low,
            };
        }

        if self.tap_reads_left.0 == 0 && self.rng.random_bool(0.002) {
            self.tap_reads_left.0 = 3;
        }
        if self.tap_reads_left.1 == 0 && self.rng.random_bool(0.002) {
            self.tap_reads_left.1 = 3;
        }

        let level = |left: &mut u32| {
            if *left > 0 {
                *left -= 1;
                Level::Low
            } else {
                Level::High
            }
        };
        ButtonLevels {
            red: level(&mut self.tap_reads_left.0),
            blue: level(&mut self.tap_reads_left.1),
        }
    }
}

//! Joystick direction sampling and button edge detection

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::platform::{ButtonLevels, InputDevice, Level};

/// One of the four grid directions. Diagonals are never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in grid space (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Per-axis joystick center and dead zone, in raw ADC units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisCalibration {
    pub center_x: i32,
    pub center_y: i32,
    pub dead_zone: i32,
}

impl AxisCalibration {
    pub fn new(center_x: i32, center_y: i32, dead_zone: i32) -> Self {
        Self {
            center_x,
            center_y,
            dead_zone,
        }
    }

    /// Average `samples` idle readings to find the resting center.
    /// Zero samples keeps the fallback center.
    pub fn sample<I: InputDevice>(
        device: &mut I,
        samples: u32,
        fallback: AxisCalibration,
    ) -> Self {
        if samples == 0 {
            return fallback;
        }
        let (mut sum_x, mut sum_y) = (0i64, 0i64);
        for _ in 0..samples {
            let (x, y) = device.read_axes();
            sum_x += x as i64;
            sum_y += y as i64;
        }
        let calibration = Self {
            center_x: (sum_x / samples as i64) as i32,
            center_y: (sum_y / samples as i64) as i32,
            dead_zone: fallback.dead_zone,
        };
        log::info!(
            "Joystick calibrated over {} samples: center=({}, {})",
            samples,
            calibration.center_x,
            calibration.center_y
        );
        calibration
    }

    /// Map raw axis readings to a direction.
    ///
    /// Inside the dead zone on both axes there is no direction. Otherwise the
    /// axis with the strictly larger deviation wins; ties go to the vertical
    /// axis. Positive deviation is Right/Down.
    pub fn direction_from_axes(&self, raw_x: i32, raw_y: i32) -> Option<Direction> {
        let dx = raw_x - self.center_x;
        let dy = raw_y - self.center_y;

        if dx.abs() < self.dead_zone && dy.abs() < self.dead_zone {
            return None;
        }

        if dx.abs() > dy.abs() {
            Some(if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if dy > 0 {
                Direction::Down
            } else {
                Direction::Up
            })
        }
    }
}

/// Press events detected since the previous poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdges {
    pub red: bool,
    pub blue: bool,
}

/// Falling-edge detector for the two active-low buttons
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    last: ButtonLevels,
}

impl EdgeDetector {
    /// Compare against the previous levels; a High -> Low transition is one press.
    pub fn update(&mut self, levels: ButtonLevels) -> ButtonEdges {
        let edges = ButtonEdges {
            red: self.last.red == Level::High && levels.red == Level::Low,
            blue: self.last.blue == Level::High && levels.blue == Level::Low,
        };
        self.last = levels;
        edges
    }
}

/// Direction and button sampling for one device
#[derive(Debug, Clone)]
pub struct InputSampler {
    calibration: AxisCalibration,
    edges: EdgeDetector,
}

impl InputSampler {
    pub fn new(calibration: AxisCalibration) -> Self {
        Self {
            calibration,
            edges: EdgeDetector::default(),
        }
    }

    pub fn sample_direction<I: InputDevice>(&self, device: &mut I) -> Option<Direction> {
        let (x, y) = device.read_axes();
        self.calibration.direction_from_axes(x, y)
    }

    pub fn poll_button_edges<I: InputDevice>(&mut self, device: &mut I) -> ButtonEdges {
        self.edges.update(device.read_buttons())
    }

    /// Forget previous button levels (new game, buttons assumed released)
    pub fn reset_edges(&mut self) {
        self.edges = EdgeDetector::default();
    }
}

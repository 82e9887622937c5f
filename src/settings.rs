//! Device settings
//!
//! Loaded once at power-on from a JSON file. Missing fields take their
//! defaults, so a settings file only needs the values it changes.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{AxisCalibration, Role};

/// Environment variable naming the settings file
pub const SETTINGS_PATH_VAR: &str = "MAZE_TAG_SETTINGS";
/// Environment variable overriding the play mode
pub const MODE_VAR: &str = "MAZE_TAG_MODE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid address {0:?}")]
    Address(String),
}

/// Which part this device plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// No link; opponent token is fixed
    #[default]
    Standalone,
    /// Runs the authoritative game and broadcasts state
    Host,
    /// Sends input, renders from host snapshots
    Peer,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Standalone => "standalone",
            PlayMode::Host => "host",
            PlayMode::Peer => "peer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standalone" | "solo" => Some(PlayMode::Standalone),
            "host" => Some(PlayMode::Host),
            "peer" => Some(PlayMode::Peer),
            _ => None,
        }
    }

    pub fn is_networked(&self) -> bool {
        *self != PlayMode::Standalone
    }
}

/// Analog stick calibration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickSettings {
    /// Resting X reading (raw ADC units)
    pub center_x: i32,
    /// Resting Y reading (raw ADC units)
    pub center_y: i32,
    /// Readings closer than this to center count as idle
    pub dead_zone: i32,
    /// Idle samples averaged at boot to find the center (0 = use the fixed center)
    pub calibration_samples: u32,
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            center_x: 1940,
            center_y: 1895,
            dead_zone: 200,
            calibration_samples: 0,
        }
    }
}

/// Link addressing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub bind_addr: String,
    pub peer_addr: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4210".to_string(),
            peer_addr: "127.0.0.1:4211".to_string(),
        }
    }
}

impl NetworkSettings {
    pub fn peer_socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.peer_addr
            .parse()
            .map_err(|_| SettingsError::Address(self.peer_addr.clone()))
    }
}

/// Device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: PlayMode,
    /// Role of the local player when there is no peer
    pub standalone_role: Role,
    pub joystick: JoystickSettings,
    /// MP3 module volume (0 - 100)
    pub volume: u8,
    pub network: NetworkSettings,
    /// Fixed RNG seed for role/maze selection (random when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: PlayMode::Standalone,
            standalone_role: Role::Chaser,
            joystick: JoystickSettings::default(),
            volume: 25,
            network: NetworkSettings::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Fixed calibration from the configured center and dead zone
    pub fn calibration(&self) -> AxisCalibration {
        AxisCalibration::new(
            self.joystick.center_x,
            self.joystick.center_y,
            self.joystick.dead_zone,
        )
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load from `$MAZE_TAG_SETTINGS` if set, then apply `$MAZE_TAG_MODE`.
    /// A missing or broken file falls back to defaults.
    pub fn load() -> Self {
        let mut settings = match std::env::var_os(SETTINGS_PATH_VAR) {
            Some(path) => Self::load_from(Path::new(&path)).unwrap_or_else(|e| {
                log::warn!("{}; using default settings", e);
                Self::default()
            }),
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Ok(mode) = std::env::var(MODE_VAR) {
            match PlayMode::from_str(&mode) {
                Some(mode) => settings.mode = mode,
                None => log::warn!("Ignoring unknown {} value {:?}", MODE_VAR, mode),
            }
        }
        settings
    }
}

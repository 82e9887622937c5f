//! Audio cues on the MP3 module
//!
//! Tracks live on the module's storage as folder/index pairs; the game only
//! ever switches between background music and the game-over jingle.

use crate::consts::AUDIO_SETTLE_MS;
use crate::platform::Clock;

/// Folder holding the game's tracks
pub const TRACK_FOLDER: u8 = 1;

/// Tracks the game uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Looping music while a game runs
    Background,
    /// Played once when a game ends
    GameOver,
}

impl Track {
    pub fn folder(self) -> u8 {
        TRACK_FOLDER
    }

    pub fn index(self) -> u8 {
        match self {
            Track::Background => 1,
            Track::GameOver => 2,
        }
    }
}

/// Playback hardware
pub trait AudioPlayer {
    fn play_track(&mut self, folder: u8, index: u8);
    fn pause(&mut self);
    /// Volume 0-100
    fn set_volume(&mut self, volume: u8);
}

/// Audio manager for the game
pub struct AudioManager<A: AudioPlayer> {
    player: A,
}

impl<A: AudioPlayer> AudioManager<A> {
    /// Wrap the player and apply the boot volume (0 - 100)
    pub fn new(mut player: A, volume: u8) -> Self {
        let volume = volume.min(100);
        log::info!("Audio volume {}", volume);
        player.set_volume(volume);
        Self { player }
    }

    /// Switch to `track`: pause, let the module settle, then play.
    pub fn cue<C: Clock>(&mut self, clock: &mut C, track: Track) {
        log::debug!("Audio cue {:?}", track);
        self.player.pause();
        clock.sleep_ms(AUDIO_SETTLE_MS);
        self.player.play_track(track.folder(), track.index());
    }

    pub fn player(&self) -> &A {
        &self.player
    }
}

/// Stand-in for the MP3 module on machines without one
#[derive(Debug, Default)]
pub struct LogAudio {
    pub playing: Option<(u8, u8)>,
}

impl AudioPlayer for LogAudio {
    fn play_track(&mut self, folder: u8, index: u8) {
        log::info!("♪ playing track {:02}/{:03}", folder, index);
        self.playing = Some((folder, index));
    }

    fn pause(&mut self) {
        self.playing = None;
    }

    fn set_volume(&mut self, volume: u8) {
        log::debug!("Volume set to {}", volume);
    }
}

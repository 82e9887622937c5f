//! Authoritative device: runs the simulation for both players
//!
//! Also used for standalone play, where there is no link and the opponent
//! token stays parked at its start cell.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Console, Phase, wait_for_restart};
use crate::audio::{AudioPlayer, Track};
use crate::consts::TICK_PERIOD_MS;
use crate::net::{HostSync, Transport};
use crate::platform::{Clock, InputDevice};
use crate::renderer::{Display, draw_board, show_result, spiral_close, text};
use crate::settings::Settings;
use crate::sim::{
    AxisCalibration, GameSession, InputSampler, MazeMap, Outcome, Role, SessionClock, SimMode,
    TickInput, tick,
};

/// Summary of one finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameReport {
    pub outcome: Outcome,
    pub host_role: Role,
    pub host_won: bool,
    pub map_index: usize,
    pub ticks: u32,
}

pub struct HostDevice<D, A, I, C, T>
where
    D: Display,
    A: AudioPlayer,
    I: InputDevice,
    C: Clock,
    T: Transport,
{
    console: Console<D, A, I, C>,
    sampler: InputSampler,
    /// Present only in networked play
    sync: Option<HostSync<T>>,
    rng: Pcg32,
    standalone_role: Role,
    phase: Phase,
}

impl<D, A, I, C, T> HostDevice<D, A, I, C, T>
where
    D: Display,
    A: AudioPlayer,
    I: InputDevice,
    C: Clock,
    T: Transport,
{
    /// Calibrates the joystick and seeds role/maze selection.
    /// Passing a transport makes this a networked host.
    pub fn new(mut console: Console<D, A, I, C>, settings: &Settings, transport: Option<T>) -> Self {
        let calibration = AxisCalibration::sample(
            &mut console.input,
            settings.joystick.calibration_samples,
            settings.calibration(),
        );
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!(
            "Host ready ({}), seed {}",
            if transport.is_some() { "networked" } else { "standalone" },
            seed
        );
        Self {
            console,
            sampler: InputSampler::new(calibration),
            sync: transport.map(HostSync::new),
            rng: Pcg32::seed_from_u64(seed),
            standalone_role: settings.standalone_role,
            phase: Phase::RoleAssignment,
        }
    }

    /// Play games forever, gated by the restart hold
    pub fn run(&mut self) -> ! {
        loop {
            self.play_game();
            self.restart_gate();
        }
    }

    /// One full game with a freshly drawn role and maze
    pub fn play_game(&mut self) -> GameReport {
        self.phase = Phase::RoleAssignment;
        let host_role = if self.sync.is_some() {
            if self.rng.random_bool(0.5) {
                Role::Chaser
            } else {
                Role::Runner
            }
        } else {
            self.standalone_role
        };
        let map_index = self.rng.random_range(0..MazeMap::catalog_len());
        self.play_game_on(host_role, map_index)
    }

    /// One full game with the given role and catalog maze
    pub fn play_game_on(&mut self, host_role: Role, map_index: usize) -> GameReport {
        let mut session = self.assign(host_role, map_index);
        self.present(&mut session);
        let ticks = self.run_active(&mut session);
        self.end(&session);

        let outcome = session.outcome.unwrap_or(Outcome::TimedOut);
        GameReport {
            outcome,
            host_role,
            host_won: outcome.is_win_for(host_role),
            map_index: session.maze.index(),
            ticks,
        }
    }

    /// Block until both buttons are held for 3 s
    pub fn restart_gate(&mut self) {
        self.phase = Phase::RestartGate;
        wait_for_restart(&mut self.console);
    }

    fn assign(&mut self, host_role: Role, map_index: usize) -> GameSession {
        if map_index >= MazeMap::catalog_len() {
            log::warn!("No maze {}, wrapping into the catalog", map_index);
        }
        let maze = MazeMap::wrapping(map_index);
        let mode = if self.sync.is_some() {
            SimMode::Networked
        } else {
            SimMode::Standalone
        };

        self.sampler.reset_edges();
        if let Some(sync) = self.sync.as_mut() {
            sync.reset();
        }

        log::info!(
            "New game: host is {} on maze {}",
            host_role.as_str(),
            maze.index()
        );
        GameSession::new(mode, host_role, maze, self.console.clock.now_ms())
    }

    fn present(&mut self, session: &mut GameSession) {
        self.phase = Phase::Presenting;
        let console = &mut self.console;
        console.display.clear();
        console.display.present();
        console.display.draw_scrolling_text(session.host_role.as_str());
        console.display.draw_scrolling_text(text::TIMER);
        console.audio.cue(&mut console.clock, Track::Background);

        // The game clock starts once the announcement is over
        let start = console.clock.now_ms();
        session.clock = SessionClock::new(start);
        if let Some(sync) = self.sync.as_mut() {
            sync.broadcast_start(session.maze.index() as u8, session.peer_role(), start);
        }
    }

    fn run_active(&mut self, session: &mut GameSession) -> u32 {
        self.phase = Phase::Active;
        let mut ticks = 0;
        loop {
            let console = &mut self.console;
            let now = console.clock.now_ms();
            ticks += 1;

            // The expiring tick takes nothing off the link
            let peer_input = if session.clock.is_expired(now) {
                None
            } else {
                self.sync.as_mut().and_then(|sync| sync.poll_peer_input())
            };
            let input = TickInput {
                direction: self.sampler.sample_direction(&mut console.input),
                edges: self.sampler.poll_button_edges(&mut console.input),
                peer_input,
            };
            if tick(session, &input, now).is_some() {
                return ticks;
            }

            draw_board(
                &mut console.display,
                session.maze.bitmap(),
                session.host.pos,
                !session.host.powerups.is_invisible(now),
                session.peer.pos,
            );

            if let Some(sync) = self.sync.as_mut() {
                sync.broadcast_state(now, session);
            }

            console.clock.sleep_ms(TICK_PERIOD_MS);
        }
    }

    fn end(&mut self, session: &GameSession) {
        self.phase = Phase::Ending;
        let host_won = session.host_won().unwrap_or(false);

        // Peer hears the result before any local presentation
        if let (Some(sync), Some(peer_won)) = (self.sync.as_mut(), session.peer_won()) {
            sync.broadcast_final_state(self.console.clock.now_ms(), session);
            sync.broadcast_game_over(peer_won);
        }

        let console = &mut self.console;
        console.audio.cue(&mut console.clock, Track::GameOver);
        spiral_close(&mut console.display, &mut console.clock);
        show_result(&mut console.display, &mut console.clock, host_won);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn console(&self) -> &Console<D, A, I, C> {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console<D, A, I, C> {
        &mut self.console
    }

    pub fn sync(&self) -> Option<&HostSync<T>> {
        self.sync.as_ref()
    }
}

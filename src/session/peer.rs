//! Peer device: follows the host's snapshots and contributes input
//!
//! The peer runs its own tick loop with local movement prediction, so its
//! own token responds immediately (including its speed boost). Every `state`
//! snapshot overwrites the local view with the host's authoritative one.

use super::{Console, Phase};
use crate::audio::{AudioPlayer, Track};
use crate::consts::TICK_PERIOD_MS;
use crate::net::{MessageLink, NetworkMessage, PeerReplica, ReplicaEvent, Transport};
use crate::platform::{Clock, InputDevice};
use crate::renderer::{Display, draw_board, show_result, spiral_close, text};
use crate::settings::Settings;
use crate::sim::{
    AxisCalibration, InputSampler, LocalPlayer, MazeMap, Outcome, PeerInput, Position, Role,
    StepRules, step,
};

/// How long past the expected end the peer waits for `game_over` before
/// deciding the result from its own replica
pub const GAME_OVER_GRACE_MS: u64 = 1_000;

/// Summary of one game as seen by the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerReport {
    pub role: Role,
    pub won: bool,
    /// True if the host's `game_over` arrived
    pub confirmed: bool,
    /// Positions as last known to the peer
    pub host_pos: Position,
    pub peer_pos: Position,
}

pub struct PeerDevice<D, A, I, C, T>
where
    D: Display,
    A: AudioPlayer,
    I: InputDevice,
    C: Clock,
    T: Transport,
{
    console: Console<D, A, I, C>,
    sampler: InputSampler,
    link: MessageLink<T>,
    /// Start of the next game, received while a game was still running
    pending: Option<PeerReplica>,
    phase: Phase,
}

impl<D, A, I, C, T> PeerDevice<D, A, I, C, T>
where
    D: Display,
    A: AudioPlayer,
    I: InputDevice,
    C: Clock,
    T: Transport,
{
    pub fn new(mut console: Console<D, A, I, C>, settings: &Settings, transport: T) -> Self {
        let calibration = AxisCalibration::sample(
            &mut console.input,
            settings.joystick.calibration_samples,
            settings.calibration(),
        );
        log::info!("Peer ready, waiting for host");
        Self {
            console,
            sampler: InputSampler::new(calibration),
            link: MessageLink::new(transport),
            pending: None,
            phase: Phase::RoleAssignment,
        }
    }

    /// Follow the host's games forever
    pub fn run(&mut self) -> ! {
        loop {
            let replica = self.await_start();
            self.play_game(replica);
        }
    }

    /// Wait for the host to begin a game.
    ///
    /// A `state` snapshot also starts the game, so a lost `start` only costs
    /// one broadcast interval.
    pub fn await_start(&mut self) -> PeerReplica {
        self.phase = Phase::RoleAssignment;
        if let Some(replica) = self.pending.take() {
            return replica;
        }

        self.console.display.clear();
        self.console.display.present();
        self.console.display.draw_scrolling_text(text::WAITING);
        loop {
            while let Some(message) = self.link.poll() {
                match message {
                    NetworkMessage::Start { .. } => {
                        if let Some(replica) = PeerReplica::from_start(&message) {
                            return replica;
                        }
                    }
                    NetworkMessage::State {
                        role_for_peer,
                        map_index,
                        ..
                    } => {
                        let mut replica = PeerReplica::new(role_for_peer, map_index);
                        replica.apply(&message);
                        log::info!("Joined game in progress from a state snapshot");
                        return replica;
                    }
                    other => log::debug!("Ignoring {} while idle", other.kind()),
                }
            }
            self.console.clock.sleep_ms(TICK_PERIOD_MS);
        }
    }

    /// Play one game from its starting replica through the result screen
    pub fn play_game(&mut self, mut replica: PeerReplica) -> PeerReport {
        self.phase = Phase::Presenting;
        let mut maze = MazeMap::wrapping(replica.map_index as usize);
        log::info!(
            "Game started: peer is {} on maze {}",
            replica.role.as_str(),
            maze.index()
        );
        {
            let console = &mut self.console;
            console.display.clear();
            console.display.present();
            console.display.draw_scrolling_text(replica.role.as_str());
            console.display.draw_scrolling_text(text::TIMER);
            console.audio.cue(&mut console.clock, Track::Background);
        }

        self.phase = Phase::Active;
        self.sampler.reset_edges();
        let mut local = LocalPlayer::new(replica.peer_pos);
        let mut input = PeerInput::default();
        let mut deadline = self.console.clock.now_ms() + replica.remaining_ms;
        let mut decided = None;

        let (won, confirmed) = loop {
            let now = self.console.clock.now_ms();

            let mut ended = None;
            while let Some(message) = self.link.poll() {
                let before = replica;
                match replica.apply(&message) {
                    ReplicaEvent::Updated => {
                        if replica.map_index != before.map_index {
                            maze = MazeMap::wrapping(replica.map_index as usize);
                            log::info!("Host is on maze {}, switching", maze.index());
                        }
                        if replica.role != before.role {
                            log::info!("Host assigned {} to the peer", replica.role.as_str());
                        }
                        local.pos = replica.peer_pos;
                        decided = decided_outcome(&replica);
                        deadline = if decided.is_some() {
                            now
                        } else {
                            now + replica.remaining_ms
                        };
                    }
                    ReplicaEvent::Ended(won) => {
                        ended = Some(won);
                        break;
                    }
                    ReplicaEvent::Started => {
                        // Host moved on without us hearing game_over
                        self.pending = Some(replica);
                        replica = before;
                        break;
                    }
                    ReplicaEvent::Ignored => {}
                }
            }
            if let Some(won) = ended {
                break (won, true);
            }
            if self.pending.is_some() || now >= deadline + GAME_OVER_GRACE_MS {
                // Nothing decided the game, so count it as a timeout
                let outcome = decided.unwrap_or(Outcome::TimedOut);
                log::warn!("No game over from host, assuming {:?}", outcome);
                break (outcome.is_win_for(replica.role), false);
            }

            let console = &mut self.console;
            // Tokens freeze once the final snapshot is in
            if decided.is_none() {
                input.direction = self.sampler.sample_direction(&mut console.input);
                let edges = self.sampler.poll_button_edges(&mut console.input);
                if edges.red {
                    input.red_pressed_count += 1;
                    local.powerups.on_red_edge(now);
                }
                if edges.blue {
                    input.blue_pressed_count += 1;
                    local.powerups.on_blue_edge(now);
                }

                let rules = StepRules {
                    boosted: local.powerups.is_speed_boosted(now),
                    double_step: true,
                };
                local.pos = step(local.pos, input.direction, &mut local.throttle, rules, now, &maze);
                replica.peer_pos = local.pos;

                self.link.send(&NetworkMessage::from(input));
            }

            draw_board(
                &mut console.display,
                maze.bitmap(),
                local.pos,
                !local.powerups.is_invisible(now),
                replica.host_pos,
            );
            console.clock.sleep_ms(TICK_PERIOD_MS);
        };

        self.phase = Phase::Ending;
        let console = &mut self.console;
        console.audio.cue(&mut console.clock, Track::GameOver);
        spiral_close(&mut console.display, &mut console.clock);
        show_result(&mut console.display, &mut console.clock, won);

        PeerReport {
            role: replica.role,
            won,
            confirmed,
            host_pos: replica.host_pos,
            peer_pos: replica.peer_pos,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn console(&self) -> &Console<D, A, I, C> {
        &self.console
    }

    pub fn link(&self) -> &MessageLink<T> {
        &self.link
    }
}

/// The host only sends coinciding positions or an empty clock in the
/// snapshot that follows its decision.
fn decided_outcome(replica: &PeerReplica) -> Option<Outcome> {
    if replica.host_pos == replica.peer_pos {
        Some(Outcome::Captured)
    } else if replica.remaining_ms == 0 {
        Some(Outcome::TimedOut)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioManager, LogAudio};
    use crate::consts::GAME_DURATION_MS;
    use crate::net::{HostSync, MemoryEndpoint, TransportError, memory_link, state_snapshot};
    use std::collections::VecDeque;
    use crate::platform::{ButtonLevels, Level, ManualClock};
    use crate::renderer::FrameBuffer;
    use crate::sim::{Direction, GameSession, HOST_START, PEER_START, SimMode};

    /// Stick pushed in a fixed direction, blue button tapped on the first read
    struct Stick {
        axes: (i32, i32),
        button_reads: u32,
    }

    impl InputDevice for Stick {
        fn read_axes(&mut self) -> (i32, i32) {
            self.axes
        }

        fn read_buttons(&mut self) -> ButtonLevels {
            self.button_reads += 1;
            ButtonLevels {
                red: Level::High,
                blue: if self.button_reads == 1 {
                    Level::Low
                } else {
                    Level::High
                },
            }
        }
    }

    /// Host side that delivers each payload once the shared clock reaches its time
    struct TimedLink {
        clock: ManualClock,
        inbox: VecDeque<(u64, Vec<u8>)>,
    }

    impl TimedLink {
        fn new(clock: ManualClock) -> Self {
            Self {
                clock,
                inbox: VecDeque::new(),
            }
        }

        fn at(mut self, due_ms: u64, bytes: &[u8]) -> Self {
            self.inbox.push_back((due_ms, bytes.to_vec()));
            self
        }

        fn message_at(self, due_ms: u64, message: NetworkMessage) -> Self {
            self.at(due_ms, &message.encode().unwrap())
        }
    }

    impl Transport for TimedLink {
        fn send(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }

        fn try_receive(&mut self) -> Option<Vec<u8>> {
            let now = self.clock.now_ms();
            if self.inbox.front().is_some_and(|(due, _)| *due <= now) {
                self.inbox.pop_front().map(|(_, bytes)| bytes)
            } else {
                None
            }
        }
    }

    type TestPeer<T> = PeerDevice<FrameBuffer, LogAudio, Stick, ManualClock, T>;

    fn peer_on<T: Transport>(axes: (i32, i32), clock: ManualClock, transport: T) -> TestPeer<T> {
        let console = Console::new(
            FrameBuffer::default(),
            AudioManager::new(LogAudio::default(), 25),
            Stick {
                axes,
                button_reads: 0,
            },
            clock,
        );
        PeerDevice::new(console, &Settings::default(), transport)
    }

    fn peer(axes: (i32, i32), transport: MemoryEndpoint) -> (TestPeer<MemoryEndpoint>, ManualClock) {
        let clock = ManualClock::new(0);
        (peer_on(axes, clock.clone(), transport), clock)
    }

    fn host_session() -> GameSession {
        GameSession::new(SimMode::Networked, Role::Chaser, MazeMap::wrapping(0), 0)
    }

    #[test]
    fn test_peer_plays_until_game_over() {
        let (peer_end, host_end) = memory_link();
        let mut host = HostSync::new(host_end);
        host.broadcast_start(0, Role::Runner, 0);
        host.broadcast_game_over(true);

        let (mut device, _clock) = peer((1940, 1895), peer_end);
        let replica = device.await_start();
        assert_eq!(replica.role, Role::Runner);
        let report = device.play_game(replica);
        assert_eq!(
            report,
            PeerReport {
                role: Role::Runner,
                won: true,
                confirmed: true,
                host_pos: HOST_START,
                peer_pos: PEER_START,
            }
        );
        assert_eq!(device.phase(), Phase::Ending);
        assert_eq!(
            device.console().display.texts,
            vec![text::WAITING, "Runner", text::TIMER, text::WON]
        );
    }

    #[test]
    fn test_state_snapshot_starts_game_when_start_is_lost() {
        let (peer_end, host_end) = memory_link();
        let mut host = HostSync::new(host_end);
        let mut session = host_session();
        session.host.pos = Position::new(6, 7);
        host.broadcast_state(0, &session);

        let (mut device, _clock) = peer((1940, 1895), peer_end);
        let replica = device.await_start();
        assert_eq!(replica.role, Role::Runner);
        assert_eq!(replica.host_pos, Position::new(6, 7));
    }

    #[test]
    fn test_peer_sends_input_every_tick_and_predicts_boosted_move() {
        let (peer_end, mut host_end) = memory_link();
        // Host will never answer; the peer gives up after its own timer
        let (mut device, clock) = peer((1940, 3000), peer_end);
        let started = clock.now_ms();
        let report = device.play_game(PeerReplica::new(Role::Chaser, 0));

        assert!(!report.confirmed);
        assert!(!report.won);
        assert!(clock.now_ms() - started >= GAME_DURATION_MS + GAME_OVER_GRACE_MS);

        let mut inputs = Vec::new();
        while let Some(bytes) = host_end.try_receive() {
            inputs.push(NetworkMessage::decode(&bytes).unwrap());
        }
        let ticks = ((GAME_DURATION_MS + GAME_OVER_GRACE_MS) / TICK_PERIOD_MS) as usize;
        assert!(inputs.len() >= ticks - 1, "only {} inputs", inputs.len());
        assert_eq!(
            inputs[0],
            NetworkMessage::Input {
                direction: Some(Direction::Down),
                red_pressed_count: 0,
                blue_pressed_count: 1,
            }
        );
        assert_eq!(device.link().stats().sent as usize, inputs.len());
        // Column 0 of maze 0 is open all the way down
        assert_eq!(report.peer_pos, Position::new(0, 7));
    }

    #[test]
    fn test_snapshot_overrides_prediction() {
        let (peer_end, host_end) = memory_link();
        let mut host = HostSync::new(host_end);
        let mut session = host_session();
        session.peer.pos = Position::new(0, 3);
        session.host.pos = Position::new(0, 4);
        host.broadcast_state(0, &session);
        host.broadcast_game_over(false);

        // Stick held right; the snapshot lands before any local step
        let (mut device, _clock) = peer((3000, 1895), peer_end);
        let report = device.play_game(PeerReplica::new(Role::Runner, 0));
        assert!(report.confirmed);
        assert!(!report.won);
        assert_eq!(report.peer_pos, Position::new(0, 3));
        assert_eq!(report.host_pos, Position::new(0, 4));
        assert_eq!(device.console().display.texts.last().unwrap(), text::LOST);
    }

    #[test]
    fn test_start_mid_game_is_kept_for_next_game() {
        let (peer_end, host_end) = memory_link();
        let mut host = HostSync::new(host_end);
        host.broadcast_start(2, Role::Chaser, 0);

        let (mut device, _clock) = peer((1940, 1895), peer_end);
        let report = device.play_game(PeerReplica::new(Role::Runner, 0));
        assert!(!report.confirmed);
        assert_eq!(report.role, Role::Runner);
        // Positions never met, so the runner is credited
        assert!(report.won);

        let next = device.await_start();
        assert_eq!(next.role, Role::Chaser);
        assert_eq!(next.map_index, 2);
        assert!(!device.console().display.texts.iter().any(|t| t == text::WAITING));
    }

    #[test]
    fn test_snapshot_with_new_maze_switches_walls() {
        // Host runs maze 2 with this peer as Chaser; the peer started on maze 0
        let clock = ManualClock::new(0);
        let session = GameSession::new(SimMode::Networked, Role::Runner, MazeMap::wrapping(2), 0);
        let link = TimedLink::new(clock.clone())
            .message_at(200, state_snapshot(&session, 0))
            .message_at(2_000, NetworkMessage::GameOver { peer_won: true });

        // Stick held right with a speed boost
        let mut device = peer_on((3000, 1895), clock, link);
        let report = device.play_game(PeerReplica::new(Role::Runner, 0));
        assert!(report.confirmed);
        assert_eq!(report.role, Role::Chaser);
        // Row 0 of maze 2 (0x10) walls off column 3; maze 0 would reach (7, 0)
        assert_eq!(report.peer_pos, Position::new(2, 0));
        assert_eq!(report.host_pos, HOST_START);
    }

    #[test]
    fn test_off_grid_snapshot_cannot_corrupt_peer() {
        let clock = ManualClock::new(0);
        let link = TimedLink::new(clock.clone())
            .at(
                200,
                br#"{"type":"state","host_pos":[7,7],"peer_pos":[2147483647,0],"role_for_peer":"runner","map_index":0,"remaining_ms":5000}"#,
            )
            .message_at(1_000, NetworkMessage::GameOver { peer_won: false });

        let mut device = peer_on((3000, 1895), clock, link);
        let report = device.play_game(PeerReplica::new(Role::Runner, 0));
        assert!(report.confirmed);
        assert_eq!(report.peer_pos, Position::new(7, 0));
        assert_eq!(device.link().stats().discarded, 1);
    }

    #[test]
    fn test_final_snapshot_decides_when_game_over_is_lost() {
        let (peer_end, host_end) = memory_link();
        let mut host = HostSync::new(host_end);
        let mut session = host_session();
        session.host.pos = Position::new(0, 2);
        session.peer.pos = Position::new(0, 2);
        host.broadcast_final_state(30_000, &session);

        let (mut device, clock) = peer((1940, 3000), peer_end);
        let report = device.play_game(PeerReplica::new(Role::Runner, 0));
        assert!(!report.confirmed);
        assert!(!report.won);
        assert_eq!(report.peer_pos, Position::new(0, 2));
        // Gives up one grace period after the decisive snapshot, not at the deadline
        assert!(clock.now_ms() < 10_000);
    }
}

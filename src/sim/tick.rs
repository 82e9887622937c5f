//! Host simulation tick
//!
//! Core game loop step that advances the authoritative state. Pure: all
//! hardware reads and network traffic happen in the caller.

use super::input::{ButtonEdges, Direction};
use super::motion::{StepRules, step};
use super::state::{GameSession, Outcome};

/// Latest input snapshot received from the peer device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeerInput {
    pub direction: Option<Direction>,
    pub red_pressed_count: u32,
    pub blue_pressed_count: u32,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Local joystick direction
    pub direction: Option<Direction>,
    /// Local button presses since the previous tick
    pub edges: ButtonEdges,
    /// Peer input message buffered this tick, if any
    pub peer_input: Option<PeerInput>,
}

/// Advance the game by one tick at time `now`.
///
/// Returns the outcome on the tick the game ends. Ticking a finished game
/// does nothing.
pub fn tick(session: &mut GameSession, input: &TickInput, now: u64) -> Option<Outcome> {
    if session.is_over() {
        return None;
    }

    if session.clock.is_expired(now) {
        return finish(session, Outcome::TimedOut, now);
    }

    if session.is_networked() {
        if let Some(peer) = input.peer_input {
            session.peer.direction = peer.direction;
            session.peer.red_pressed_count = peer.red_pressed_count;
            session.peer.blue_pressed_count = peer.blue_pressed_count;
        }
    }

    if input.edges.red {
        session.host.powerups.on_red_edge(now);
    }
    if input.edges.blue {
        session.host.powerups.on_blue_edge(now);
    }

    let rules = StepRules {
        boosted: session.host.powerups.is_speed_boosted(now),
        double_step: session.is_networked(),
    };
    session.host.pos = step(
        session.host.pos,
        input.direction,
        &mut session.host.throttle,
        rules,
        now,
        &session.maze,
    );

    // The peer's own boost never reaches the host, so it always moves at base speed
    if session.is_networked() {
        session.peer.pos = step(
            session.peer.pos,
            session.peer.direction,
            &mut session.peer.throttle,
            StepRules::BASE,
            now,
            &session.maze,
        );
    }

    if session.host.pos == session.peer.pos {
        return finish(session, Outcome::Captured, now);
    }

    None
}

fn finish(session: &mut GameSession, outcome: Outcome, now: u64) -> Option<Outcome> {
    session.outcome = Some(outcome);
    log::info!(
        "Game over: {:?} after {} ms (host {} {})",
        outcome,
        session.clock.elapsed(now),
        session.host_role.as_str(),
        if outcome.is_win_for(session.host_role) {
            "wins"
        } else {
            "loses"
        }
    );
    Some(outcome)
}

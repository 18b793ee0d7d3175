//! Per-frame simulation tick
//!
//! Advances one host frame: every actor's motion first, then projectiles
//! against the freshly committed poses, then the round state machine.

use super::actors::ActorId;
use super::round::RoundSignal;
use super::state::{Arena, GameEvent, GameState};

/// Advance the session by one frame of `dt` seconds
pub fn tick(state: &mut GameState, dt: f32) {
    if state.torn_down || dt.is_nan() || dt <= 0.0 {
        return;
    }
    state.clock += dt as f64;

    let arena = Arena {
        maze: &state.maze,
        cell_size: state.cell_size,
        settings: &state.settings,
    };

    for controller in &state.controllers {
        controller.update(dt, &arena, &mut state.actors, &mut state.rng);
    }

    let first_new = state.events.len();
    let hits = state
        .projectiles
        .update(dt, state.clock, &arena, &mut state.actors, &mut state.events);
    if hits > 0 {
        credit_kills(state, first_new);
    }

    // Round timer runs on the unclamped frame delta
    if let Some(RoundSignal::ResetDue(outcome)) = state.round.update(dt) {
        state.finish_round(outcome);
        return;
    }
    if let Some(RoundSignal::CountdownStarted { outcome, duration }) = state.round.check(state.actors.alive_count()) {
        state.events.push(GameEvent::RoundEnding {
            outcome,
            remaining: duration,
        });
    }
}

/// Carry this frame's kills over to the session scoreboard
fn credit_kills(state: &mut GameState, first_new: usize) {
    let killers: Vec<ActorId> = state.events[first_new..]
        .iter()
        .filter_map(|event| match event {
            GameEvent::ActorHit { killer: Some(k), .. } => Some(*k),
            _ => None,
        })
        .collect();

    for killer in killers {
        if let Some(actor) = state.actors.get(killer) {
            state.scoreboard.record_kill(actor.player_index);
        }
    }
}

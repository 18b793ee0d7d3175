//! Round life cycle
//!
//! Watches the alive count and runs the end-of-round countdown as an
//! elapsed-time accumulator advanced by the frame tick.

use serde::{Deserialize, Serialize};

/// How a round is ending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// One actor left standing
    Win,
    /// Nobody left
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    Active,
    CountdownToEnd {
        outcome: RoundOutcome,
        duration: f32,
        elapsed: f32,
    },
    Resetting,
}

/// What the caller should act on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundSignal {
    /// A countdown began (or was replaced by a draw countdown)
    CountdownStarted { outcome: RoundOutcome, duration: f32 },
    /// The countdown elapsed; the caller must reset and then call `finish_reset`
    ResetDue(RoundOutcome),
}

#[derive(Debug, Clone)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    win_countdown: f32,
    draw_countdown: f32,
}

impl RoundStateMachine {
    pub fn new(win_countdown: f32, draw_countdown: f32) -> Self {
        Self {
            phase: RoundPhase::Active,
            win_countdown,
            draw_countdown,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    /// Seconds left on the countdown, if one is running
    pub fn remaining(&self) -> Option<f32> {
        match self.phase {
            RoundPhase::CountdownToEnd { duration, elapsed, .. } => Some((duration - elapsed).max(0.0)),
            _ => None,
        }
    }

    /// Re-evaluate after kills. Safe to call any number of times per frame.
    pub fn check(&mut self, alive: usize) -> Option<RoundSignal> {
        let outcome = match alive {
            0 => RoundOutcome::Draw,
            1 => RoundOutcome::Win,
            _ => return None,
        };

        match self.phase {
            RoundPhase::Active => {}
            // The survivor died before the win was called
            RoundPhase::CountdownToEnd {
                outcome: RoundOutcome::Win,
                ..
            } if outcome == RoundOutcome::Draw => {}
            _ => return None,
        }

        let duration = match outcome {
            RoundOutcome::Win => self.win_countdown,
            RoundOutcome::Draw => self.draw_countdown,
        };
        log::info!("Round ending ({:?}) in {:.1}s", outcome, duration);
        self.phase = RoundPhase::CountdownToEnd {
            outcome,
            duration,
            elapsed: 0.0,
        };
        Some(RoundSignal::CountdownStarted { outcome, duration })
    }

    /// Advance the countdown by the frame delta
    pub fn update(&mut self, dt: f32) -> Option<RoundSignal> {
        let RoundPhase::CountdownToEnd {
            outcome,
            duration,
            elapsed,
        } = self.phase
        else {
            return None;
        };

        let elapsed = elapsed + dt.max(0.0);
        if elapsed >= duration {
            // Held until finish_reset so the reset cannot be fired twice
            self.phase = RoundPhase::Resetting;
            Some(RoundSignal::ResetDue(outcome))
        } else {
            self.phase = RoundPhase::CountdownToEnd {
                outcome,
                duration,
                elapsed,
            };
            None
        }
    }

    /// Reset has been carried out; start watching the new round
    pub fn finish_reset(&mut self) {
        self.phase = RoundPhase::Active;
    }

    /// Cancel a running countdown without resetting
    pub fn stop_timer(&mut self) {
        if matches!(self.phase, RoundPhase::CountdownToEnd { .. }) {
            log::debug!("Round countdown cancelled");
            self.phase = RoundPhase::Active;
        }
    }
}

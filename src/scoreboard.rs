//! Session scoreboard
//!
//! Kill and round-win totals per player seat. Lives for one session in memory;
//! actors come and go each round but their seats keep accumulating here.

use serde::{Deserialize, Serialize};

/// Totals for one player seat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_index: usize,
    /// Opponents destroyed
    pub kills: u32,
    /// Rounds survived as the last actor standing
    pub wins: u32,
}

/// Per-seat totals, indexed by player index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<PlayerScore>,
    /// Rounds completed this session (wins and draws)
    pub rounds: u32,
}

impl Scoreboard {
    /// Empty scoreboard for `players` seats
    pub fn new(players: usize) -> Self {
        Self {
            entries: (0..players)
                .map(|player_index| PlayerScore {
                    player_index,
                    ..Default::default()
                })
                .collect(),
            rounds: 0,
        }
    }

    pub fn get(&self, player_index: usize) -> Option<&PlayerScore> {
        self.entries.get(player_index)
    }

    pub fn record_kill(&mut self, player_index: usize) {
        if let Some(entry) = self.entries.get_mut(player_index) {
            entry.kills += 1;
        }
    }

    /// Close a round, crediting the survivor if there was one
    pub fn record_round(&mut self, winner: Option<usize>) {
        self.rounds += 1;
        if let Some(entry) = winner.and_then(|w| self.entries.get_mut(w)) {
            entry.wins += 1;
        }
    }

    /// Entries ranked by wins, then kills. Ties keep seat order.
    pub fn standings(&self) -> Vec<PlayerScore> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.kills.cmp(&a.kills)));
        ranked
    }

    /// Seat with the most wins, if anyone has won
    pub fn leader(&self) -> Option<usize> {
        self.standings()
            .first()
            .filter(|top| top.wins > 0)
            .map(|top| top.player_index)
    }

    pub fn total_kills(&self) -> u32 {
        self.entries.iter().map(|e| e.kills).sum()
    }
}

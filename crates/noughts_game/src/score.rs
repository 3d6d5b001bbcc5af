//! Cumulative scores across rounds.

use crate::{Outcome, Player};
use serde::{Deserialize, Serialize};

/// Wins per player plus drawn rounds. Survives board resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    cross_wins: u32,
    circle_wins: u32,
    draws: u32,
}

impl Scoreboard {
    /// Wins recorded for `player`.
    pub fn wins(&self, player: Player) -> u32 {
        match player {
            Player::Cross => self.cross_wins,
            Player::Circle => self.circle_wins,
        }
    }

    /// Rounds that ended without a winner.
    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Counts a finished round. Pending outcomes are ignored.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Win {
                player: Player::Cross,
                ..
            } => self.cross_wins += 1,
            Outcome::Win {
                player: Player::Circle,
                ..
            } => self.circle_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Pending => {}
        }
    }
}

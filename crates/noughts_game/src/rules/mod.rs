//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are separated from
//! board storage so that the local game, the networked session and the relay
//! all evaluate positions the same way.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{Line, LINES, check_winner, evaluate};

use crate::Player;
use serde::{Deserialize, Serialize};

/// Result of evaluating a board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// No completed line and at least one unplayed square.
    #[default]
    Pending,
    /// `player` owns every square of `line`.
    Win {
        /// The winner.
        player: Player,
        /// The completed line.
        line: Line,
    },
    /// Every square is owned and nobody completed a line.
    Draw,
}

impl Outcome {
    /// True once the round has ended.
    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }

    /// The winning player, if any.
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Win { player, .. } => Some(*player),
            _ => None,
        }
    }

    /// The completed line, if any.
    pub fn line(&self) -> Option<Line> {
        match self {
            Outcome::Win { line, .. } => Some(*line),
            _ => None,
        }
    }
}

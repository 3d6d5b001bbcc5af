//! Turn tracking.

use crate::Player;
use tracing::{debug, instrument};

/// Tracks whose move is next.
///
/// Starts with no active player; the first [`advance`](Self::advance)
/// establishes [`Player::FIRST`]. Never touches the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnController {
    active: Option<Player>,
}

impl TurnController {
    /// Creates an unstarted controller.
    pub fn new() -> Self {
        Self { active: None }
    }

    /// The player to move, once started.
    pub fn active(&self) -> Option<Player> {
        self.active
    }

    /// Flips the active player, or starts with the first mover.
    #[instrument(skip(self), fields(from = ?self.active))]
    pub fn advance(&mut self) -> Player {
        let next = match self.active {
            None => Player::FIRST,
            Some(player) => player.opponent(),
        };
        debug!(to = ?next, "Advanced turn");
        self.active = Some(next);
        next
    }

    /// Forces the active player, as announced by the relay.
    pub fn set(&mut self, player: Player) {
        self.active = Some(player);
    }

    /// Back to the unstarted state.
    pub fn reset(&mut self) {
        self.active = None;
    }
}

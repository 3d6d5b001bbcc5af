//! At most one player can own a complete line.

use super::Invariant;
use crate::{Game, LINES, Player};

/// Invariant: completed lines never belong to both players at once.
pub struct SingleWinnerInvariant;

impl Invariant<Game> for SingleWinnerInvariant {
    fn holds(game: &Game) -> bool {
        let owns_line = |player: Player| LINES.iter().any(|line| line.owned_by(game.board(), player));
        !(owns_line(Player::Cross) && owns_line(Player::Circle))
    }

    fn description() -> &'static str {
        "At most one player owns a complete line"
    }
}

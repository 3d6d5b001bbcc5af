//! Monotonic board invariant: squares never change once set.

use super::Invariant;
use crate::{Board, Game, Square};

/// Invariant: board squares are monotonic (never overwritten).
///
/// Replaying the round's history onto an empty board must place every move
/// on an unplayed square and reproduce the current board exactly.
pub struct MonotonicBoardInvariant;

impl Invariant<Game> for MonotonicBoardInvariant {
    fn holds(game: &Game) -> bool {
        let mut reconstructed = Board::new();

        for mov in game.history() {
            if reconstructed.get(mov.position) != Square::Empty {
                return false;
            }
            if reconstructed.place(mov.position, mov.player).is_err() {
                return false;
            }
        }

        reconstructed == *game.board()
    }

    fn description() -> &'static str {
        "Board squares are monotonic (never overwritten)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Move, Player, Position};

    #[test]
    fn test_empty_game_holds() {
        assert!(MonotonicBoardInvariant::holds(&Game::new()));
    }

    #[test]
    fn test_remote_moves_hold() {
        let mut game = Game::new();
        game.apply_moves([
            (Position::TopLeft, Player::Cross),
            (Position::Center, Player::Circle),
        ]);
        assert!(MonotonicBoardInvariant::holds(&game));
    }

    #[test]
    fn test_duplicate_history_violates() {
        let mut game = Game::new();
        game.play(Position::Center).unwrap();
        game.history.push(Move::new(Player::Circle, Position::Center));
        assert!(!MonotonicBoardInvariant::holds(&game));
    }
}

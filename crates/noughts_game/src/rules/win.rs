//! Win detection logic for tic-tac-toe.

use super::Outcome;
use super::draw::is_full;
use crate::{Board, Player, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Three positions that win when owned by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Line(pub [Position; 3]);

impl Line {
    /// Positions of this line.
    pub fn positions(&self) -> [Position; 3] {
        self.0
    }

    /// True if `pos` is one of the three squares.
    pub fn contains(&self, pos: Position) -> bool {
        self.0.contains(&pos)
    }

    /// True if `player` owns every square of the line.
    pub fn owned_by(&self, board: &Board, player: Player) -> bool {
        self.0
            .iter()
            .all(|pos| board.get(*pos) == Square::Occupied(player))
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "[{}, {}, {}]", a.to_index(), b.to_index(), c.to_index())
    }
}

/// The eight winning lines. Order is the tie-break when evaluating.
pub const LINES: [Line; 8] = [
    // Rows
    Line([Position::TopLeft, Position::TopCenter, Position::TopRight]),
    Line([
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
    ]),
    Line([
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ]),
    // Columns
    Line([
        Position::TopLeft,
        Position::MiddleLeft,
        Position::BottomLeft,
    ]),
    Line([
        Position::TopCenter,
        Position::Center,
        Position::BottomCenter,
    ]),
    Line([
        Position::TopRight,
        Position::MiddleRight,
        Position::BottomRight,
    ]),
    // Diagonals
    Line([Position::TopLeft, Position::Center, Position::BottomRight]),
    Line([Position::TopRight, Position::Center, Position::BottomLeft]),
];

/// Evaluates the board from `player`'s point of view.
///
/// Returns the first line in [`LINES`] that `player` owns entirely. A full
/// board without such a line is a draw.
#[instrument(skip(board))]
pub fn evaluate(board: &Board, player: Player) -> Outcome {
    if let Some(line) = LINES.iter().find(|line| line.owned_by(board, player)) {
        return Outcome::Win {
            player,
            line: *line,
        };
    }

    if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Pending
    }
}

/// Checks if either player has three in a row.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<(Player, Line)> {
    LINES.iter().find_map(|line| {
        let [a, _, _] = line.positions();
        match board.get(a) {
            Square::Occupied(player) if line.owned_by(board, player) => Some((player, *line)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cells: &[(Position, Player)]) -> Board {
        let mut board = Board::new();
        for (pos, player) in cells {
            board.place(*pos, *player).unwrap();
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new();
        assert_eq!(check_winner(&board), None);
        assert_eq!(evaluate(&board, Player::Cross), Outcome::Pending);
    }

    #[test]
    fn test_every_line_wins_for_its_owner() {
        for line in LINES {
            for player in Player::BOTH {
                let cells: Vec<_> = line.positions().iter().map(|p| (*p, player)).collect();
                let board = board_with(&cells);

                assert_eq!(evaluate(&board, player), Outcome::Win { player, line });
                assert_eq!(evaluate(&board, player.opponent()), Outcome::Pending);
                assert_eq!(check_winner(&board), Some((player, line)));
            }
        }
    }

    #[test]
    fn test_broken_line_never_wins() {
        for line in LINES {
            for broken in 0..3 {
                let cells: Vec<_> = line
                    .positions()
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let owner = if i == broken {
                            Player::Circle
                        } else {
                            Player::Cross
                        };
                        (*p, owner)
                    })
                    .collect();
                let board = board_with(&cells);

                assert_eq!(evaluate(&board, Player::Cross), Outcome::Pending);
                assert_eq!(check_winner(&board), None);
            }
        }
    }

    #[test]
    fn test_first_line_breaks_ties() {
        // X owns the top row and the left column
        let board = board_with(&[
            (Position::TopLeft, Player::Cross),
            (Position::TopCenter, Player::Cross),
            (Position::TopRight, Player::Cross),
            (Position::MiddleLeft, Player::Cross),
            (Position::BottomLeft, Player::Cross),
        ]);
        assert_eq!(
            evaluate(&board, Player::Cross).line(),
            Some(LINES[0]),
        );
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        // X X X / O O X / X O O
        let board = board_with(&[
            (Position::TopLeft, Player::Cross),
            (Position::TopCenter, Player::Cross),
            (Position::TopRight, Player::Cross),
            (Position::MiddleLeft, Player::Circle),
            (Position::Center, Player::Circle),
            (Position::MiddleRight, Player::Cross),
            (Position::BottomLeft, Player::Cross),
            (Position::BottomCenter, Player::Circle),
            (Position::BottomRight, Player::Circle),
        ]);
        assert!(matches!(evaluate(&board, Player::Cross), Outcome::Win { .. }));
    }
}

//! Core domain types for tic-tac-toe.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Player in the game.
///
/// On the wire a player is its numeric id: `0` for the first mover, `1` for
/// the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    /// Crosses (moves first).
    Cross,
    /// Circles (moves second).
    Circle,
}

impl Player {
    /// The player who opens every round.
    pub const FIRST: Player = Player::Cross;

    /// Both players in seat order.
    pub const BOTH: [Player; 2] = [Player::Cross, Player::Circle];

    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::Cross => Player::Circle,
            Player::Circle => Player::Cross,
        }
    }

    /// Numeric id used by the relay protocol.
    pub fn id(self) -> u8 {
        match self {
            Player::Cross => 0,
            Player::Circle => 1,
        }
    }

    /// Board symbol for this player.
    pub fn mark(self) -> char {
        match self {
            Player::Cross => 'X',
            Player::Circle => 'O',
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mark())
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.id()
    }
}

impl TryFrom<u8> for Player {
    type Error = UnknownPlayer;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Player::Cross),
            1 => Ok(Player::Circle),
            other => Err(UnknownPlayer(other)),
        }
    }
}

/// A player id outside `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Unknown player id {}", _0)]
pub struct UnknownPlayer(pub u8);

impl std::error::Error for UnknownPlayer {}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Unplayed square.
    #[default]
    Empty,
    /// Square owned by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the owner, if any.
    pub fn owner(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// Rejected board mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The square already has an owner.
    #[display("Square {} is already owned by {}", _0, _1)]
    AlreadyOwned(Position, Player),
}

impl std::error::Error for BoardError {}

/// 3x3 tic-tac-toe board.
///
/// Squares only ever move from `Empty` to `Occupied`; the sole way back is
/// [`Board::clear`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Assigns an unplayed square to `player`.
    pub fn place(&mut self, pos: Position, player: Player) -> Result<(), BoardError> {
        match self.get(pos) {
            Square::Occupied(owner) => Err(BoardError::AlreadyOwned(pos, owner)),
            Square::Empty => {
                self.squares[pos.to_index()] = Square::Occupied(player);
                Ok(())
            }
        }
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Iterates over owned squares in index order.
    pub fn owned(&self) -> impl Iterator<Item = (Position, Player)> + '_ {
        Position::ALL
            .into_iter()
            .filter_map(|pos| self.get(pos).owner().map(|player| (pos, player)))
    }

    /// Resets every square to unplayed.
    pub fn clear(&mut self) {
        self.squares = [Square::Empty; 9];
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(player) => player.mark().to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

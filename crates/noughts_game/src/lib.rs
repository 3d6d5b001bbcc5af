//! Pure tic-tac-toe game logic.
//!
//! - [`Board`] holds nine squares that only move from unplayed to owned.
//! - [`TurnController`] toggles the player to move.
//! - [`rules::evaluate`] checks the eight [`LINES`] and detects draws.
//! - [`Game`] ties them together with names and a [`Scoreboard`].
//!
//! ```
//! use noughts_game::{Game, Outcome, Player, Position};
//!
//! let mut game = Game::new();
//! for pos in [0, 3, 1, 4, 2] {
//!     game.play(Position::from_index(pos).unwrap()).unwrap();
//! }
//! assert!(matches!(game.outcome(), Outcome::Win { player: Player::Cross, .. }));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
pub mod invariants;
mod position;
pub mod rules;
mod score;
mod turn;
mod types;

pub use action::{Move, MoveError};
pub use game::{DEFAULT_NAMES, Game};
pub use position::{OutOfBoard, Position};
pub use rules::{LINES, Line, Outcome};
pub use score::Scoreboard;
pub use turn::TurnController;
pub use types::{Board, BoardError, Player, Square, UnknownPlayer};

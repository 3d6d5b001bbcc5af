//! The game model: board, turn, outcome, names and scores.
//!
//! A [`Game`] is the single authoritative state object. Local play drives it
//! through [`Game::play`]; networked play drives it through the `apply_*`
//! methods as relay messages arrive. Rendering only ever reads from it.

use crate::invariants::{GameInvariants, InvariantSet};
use crate::rules::{self, Line, Outcome};
use crate::{Board, Move, MoveError, Player, Position, Scoreboard, Square, TurnController};
use tracing::{debug, info, instrument, warn};

/// Default display names by seat.
pub const DEFAULT_NAMES: [&str; 2] = ["Player 1", "Player 2"];

/// Tic-tac-toe game engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub(crate) board: Board,
    turn: TurnController,
    outcome: Outcome,
    pub(crate) history: Vec<Move>,
    names: [String; 2],
    scores: Scoreboard,
}

impl Game {
    /// Creates a new game with the first mover to play.
    #[instrument]
    pub fn new() -> Self {
        Self::with_names(DEFAULT_NAMES[0], DEFAULT_NAMES[1])
    }

    /// Creates a new game with the given display names.
    #[instrument(skip_all, fields(first = %first.as_ref(), second = %second.as_ref()))]
    pub fn with_names(first: impl AsRef<str>, second: impl AsRef<str>) -> Self {
        let mut turn = TurnController::new();
        turn.advance();
        Self {
            board: Board::new(),
            turn,
            outcome: Outcome::Pending,
            history: Vec::new(),
            names: [first.as_ref().to_string(), second.as_ref().to_string()],
            scores: Scoreboard::default(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player to move.
    pub fn to_move(&self) -> Player {
        self.turn.active().unwrap_or(Player::FIRST)
    }

    /// Outcome of the current round.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// True once the round has a winner or is drawn.
    pub fn is_over(&self) -> bool {
        self.outcome.is_over()
    }

    /// The round's winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.outcome.winner()
    }

    /// The completed line, if any.
    pub fn winning_line(&self) -> Option<Line> {
        self.outcome.line()
    }

    /// Moves of the current round, in the order they were applied.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Display name for `player`.
    pub fn name(&self, player: Player) -> &str {
        &self.names[usize::from(player.id())]
    }

    /// Cumulative scores.
    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    /// Places `player`'s mark on `pos` and evaluates the board.
    ///
    /// Leaves the game untouched if the round is over or the square is owned.
    /// Does not check whose turn it is; see [`Game::play`].
    #[instrument(skip(self))]
    pub fn attempt_move(&mut self, pos: Position, player: Player) -> Result<Outcome, MoveError> {
        if self.is_over() {
            debug!("Round already over, ignoring move");
            return Err(MoveError::GameOver);
        }

        self.board
            .place(pos, player)
            .map_err(|_| MoveError::SquareOccupied(pos))?;
        self.history.push(Move::new(player, pos));

        self.outcome = rules::evaluate(&self.board, player);
        self.scores.record(&self.outcome);
        self.turn.advance();

        debug_assert!(
            GameInvariants::check_all(self).is_ok(),
            "Move {player} -> {pos} broke a game invariant"
        );

        if self.is_over() {
            info!(outcome = ?self.outcome, "Round finished");
        }
        Ok(self.outcome)
    }

    /// Plays `pos` for whoever is to move.
    #[instrument(skip(self))]
    pub fn play(&mut self, pos: Position) -> Result<Outcome, MoveError> {
        self.attempt_move(pos, self.to_move())
    }

    /// Plays `pos` for `player`, rejecting moves out of turn.
    #[instrument(skip(self))]
    pub fn play_as(&mut self, player: Player, pos: Position) -> Result<Outcome, MoveError> {
        if self.to_move() != player {
            return Err(MoveError::WrongPlayer(player));
        }
        self.attempt_move(pos, player)
    }

    /// Clears the board and hands the move back to the first player.
    ///
    /// Names and scores are kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!(moves = self.history.len(), "Resetting round");
        self.board.clear();
        self.history.clear();
        self.outcome = Outcome::Pending;
        self.turn.reset();
        self.turn.advance();
    }

    /// Replaces display names; `None` keeps the current one.
    pub fn apply_names(&mut self, first: Option<&str>, second: Option<&str>) {
        if let Some(name) = first {
            self.names[0] = name.to_string();
        }
        if let Some(name) = second {
            self.names[1] = name.to_string();
        }
    }

    /// Forces the player to move.
    pub fn apply_turn(&mut self, player: Player) {
        self.turn.set(player);
    }

    /// Copies owned squares from a remote move list onto the board.
    ///
    /// Squares this board already holds are skipped; returns how many squares
    /// changed.
    #[instrument(skip_all)]
    pub fn apply_moves(&mut self, moves: impl IntoIterator<Item = (Position, Player)>) -> usize {
        let mut applied = 0;
        for (pos, player) in moves {
            match self.board.get(pos) {
                Square::Empty => {
                    // place() cannot fail on an empty square
                    if self.board.place(pos, player).is_ok() {
                        self.history.push(Move::new(player, pos));
                        applied += 1;
                    }
                }
                Square::Occupied(owner) if owner == player => {}
                Square::Occupied(owner) => {
                    warn!(?pos, ?owner, claimed_by = ?player, "Remote move conflicts with local board");
                }
            }
        }
        debug!(applied, "Applied remote moves");
        applied
    }

    /// Records the end of the round as announced remotely.
    ///
    /// `winner` of `None` means a draw. Only the first announcement of a round
    /// counts towards the scores.
    #[instrument(skip(self))]
    pub fn apply_result(&mut self, winner: Option<Player>, line: Option<Line>) {
        if self.is_over() {
            debug!("Result already recorded for this round");
            return;
        }

        self.outcome = match (winner, line) {
            (Some(player), Some(line)) => Outcome::Win { player, line },
            (Some(player), None) => match rules::evaluate(&self.board, player) {
                win @ Outcome::Win { .. } => win,
                _ => {
                    warn!(?player, "Winner announced without a line on the local board");
                    return;
                }
            },
            (None, _) => Outcome::Draw,
        };
        self.scores.record(&self.outcome);
        info!(outcome = ?self.outcome, "Recorded remote result");
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LINES;

    #[test]
    fn test_turn_alternates_after_moves() {
        let mut game = Game::new();
        assert_eq!(game.to_move(), Player::Cross);
        game.play(Position::Center).unwrap();
        assert_eq!(game.to_move(), Player::Circle);
        game.play(Position::TopLeft).unwrap();
        assert_eq!(game.to_move(), Player::Cross);
    }

    #[test]
    fn test_owned_square_is_left_alone() {
        let mut game = Game::new();
        game.play(Position::Center).unwrap();
        let before = game.clone();

        assert_eq!(
            game.attempt_move(Position::Center, Player::Circle),
            Err(MoveError::SquareOccupied(Position::Center))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_moves_after_win_are_ignored() {
        let mut game = Game::new();
        for pos in [0, 3, 1, 4, 2] {
            game.play(Position::from_index(pos).unwrap()).unwrap();
        }
        assert_eq!(game.winner(), Some(Player::Cross));
        let before = game.clone();

        assert_eq!(game.play(Position::BottomRight), Err(MoveError::GameOver));
        assert_eq!(game, before);
    }

    #[test]
    fn test_play_as_rejects_wrong_player() {
        let mut game = Game::new();
        assert_eq!(
            game.play_as(Player::Circle, Position::Center),
            Err(MoveError::WrongPlayer(Player::Circle))
        );
        assert!(game.board().is_empty(Position::Center));
    }

    #[test]
    fn test_win_updates_scores_and_line() {
        let mut game = Game::with_names("Ada", "Grace");
        for pos in [0, 3, 1, 4, 2] {
            game.play(Position::from_index(pos).unwrap()).unwrap();
        }
        assert_eq!(game.winning_line(), Some(LINES[0]));
        assert_eq!(game.scores().wins(Player::Cross), 1);
        assert_eq!(game.scores().wins(Player::Circle), 0);
        assert_eq!(game.name(Player::Cross), "Ada");
    }

    #[test]
    fn test_reset_keeps_names_and_scores() {
        let mut game = Game::with_names("Ada", "Grace");
        for pos in [0, 3, 1, 4, 2] {
            game.play(Position::from_index(pos).unwrap()).unwrap();
        }
        game.reset();

        assert!(game.board().squares().iter().all(|s| *s == Square::Empty));
        assert_eq!(game.winner(), None);
        assert_eq!(game.outcome(), &Outcome::Pending);
        assert_eq!(game.to_move(), Player::Cross);
        assert!(game.history().is_empty());
        assert_eq!(game.scores().wins(Player::Cross), 1);
        assert_eq!(game.name(Player::Circle), "Grace");
    }

    #[test]
    fn test_apply_moves_only_fills_empty_squares() {
        let mut game = Game::new();
        game.play(Position::Center).unwrap();

        let applied = game.apply_moves([
            (Position::Center, Player::Cross),
            (Position::TopLeft, Player::Circle),
            (Position::Center, Player::Circle),
        ]);
        assert_eq!(applied, 1);
        assert_eq!(game.board().get(Position::Center), Square::Occupied(Player::Cross));
        assert_eq!(game.board().get(Position::TopLeft), Square::Occupied(Player::Circle));
    }

    #[test]
    fn test_apply_result_counts_once() {
        let mut game = Game::new();
        game.apply_moves([
            (Position::TopLeft, Player::Circle),
            (Position::Center, Player::Circle),
            (Position::BottomRight, Player::Circle),
        ]);
        game.apply_result(Some(Player::Circle), None);
        game.apply_result(Some(Player::Circle), Some(LINES[6]));

        assert_eq!(game.winning_line(), Some(LINES[6]));
        assert_eq!(game.scores().wins(Player::Circle), 1);
    }

    #[test]
    fn test_apply_result_without_winner_is_draw() {
        let mut game = Game::new();
        game.apply_result(None, None);
        assert_eq!(game.outcome(), &Outcome::Draw);
        assert_eq!(game.scores().draws(), 1);
    }
}

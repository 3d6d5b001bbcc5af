//! Client side of a networked game.
//!
//! A [`GameSession`] never changes its board on its own. Local input only
//! produces [`ClientMessage`]s; the board, names, turn and result change when
//! the relay's [`ServerMessage`]s are applied.

use crate::protocol::{ClientMessage, GameId, GameUpdate, ServerMessage};
use noughts_game::{Game, MoveError, Outcome, Player, Position, rules};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of a networked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Phase {
    /// Nothing sent yet.
    #[display("not connected")]
    Uninitialized,
    /// Create or join sent; the other seat is still empty.
    #[display("waiting for opponent")]
    AwaitingPeer,
    /// Both players present, round in progress.
    #[display("playing")]
    Active,
    /// Round over; a restart starts the next one.
    #[display("finished")]
    Finished,
}

/// How this client entered the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Opens a new session and waits for a guest.
    Host {
        /// Host's display name.
        name: String,
    },
    /// Joins an existing session by id.
    Guest {
        /// Session to join.
        game_id: GameId,
        /// Guest's display name.
        name: String,
    },
}

/// Something the user should be told after applying a relay message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The relay opened our session; share this id.
    Invite(GameId),
    /// We hold the second seat.
    Joined(GameId),
    /// Both players are present.
    Ready,
    /// The board changed.
    Updated,
    /// The opponent has not joined yet.
    WaitingForOpponent,
    /// A new round started.
    Restarted,
    /// The round ended.
    RoundOver(Outcome),
}

/// Local request that cannot be turned into a message.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum SessionError {
    /// The session is not in the active phase.
    #[display("Session is {}, not playing", _0)]
    NotActive(Phase),
    /// The relay has not assigned us a seat yet.
    #[display("No seat assigned yet")]
    Unseated,
    /// The move would be rejected locally.
    #[display("{}", _0)]
    #[from]
    Move(MoveError),
}

impl std::error::Error for SessionError {}

/// State of one networked game as seen by this client.
#[derive(Debug, Clone)]
pub struct GameSession {
    role: Role,
    phase: Phase,
    game_id: Option<GameId>,
    seat: Option<Player>,
    game: Game,
}

impl GameSession {
    /// Creates an uninitialized session.
    #[instrument]
    pub fn new(role: Role) -> Self {
        let game_id = match &role {
            Role::Host { .. } => None,
            Role::Guest { game_id, .. } => Some(game_id.clone()),
        };
        Self {
            role,
            phase: Phase::Uninitialized,
            game_id,
            seat: None,
            game: Game::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Session id, once known.
    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// Our seat, once assigned.
    pub fn seat(&self) -> Option<Player> {
        self.seat
    }

    /// The synchronized game model.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// How this client entered the session.
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Produces the create or join request and waits for a peer.
    #[instrument(skip(self))]
    pub fn open(&mut self) -> ClientMessage {
        self.phase = Phase::AwaitingPeer;
        match &self.role {
            Role::Host { name } => {
                info!(%name, "Requesting new session");
                ClientMessage::Create {
                    first_player: name.clone(),
                }
            }
            Role::Guest { game_id, name } => {
                info!(%game_id, %name, "Requesting to join session");
                ClientMessage::Join {
                    game_id: game_id.clone(),
                    second_player: name.clone(),
                }
            }
        }
    }

    /// Turns a click on `pos` into a `play` request.
    ///
    /// Nothing changes locally; the board updates when the relay echoes the
    /// move back.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn request_move(&self, pos: Position) -> Result<ClientMessage, SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotActive(self.phase));
        }
        let (Some(game_id), Some(seat)) = (self.game_id.clone(), self.seat) else {
            return Err(SessionError::Unseated);
        };
        if self.game.is_over() {
            return Err(MoveError::GameOver.into());
        }
        if !self.game.board().is_empty(pos) {
            return Err(MoveError::SquareOccupied(pos).into());
        }
        if self.game.to_move() != seat {
            return Err(MoveError::WrongPlayer(seat).into());
        }

        Ok(ClientMessage::Play {
            cell: pos,
            player_id: seat,
            game_id,
        })
    }

    /// Builds a `restart` request.
    #[instrument(skip(self))]
    pub fn request_restart(&self) -> Result<ClientMessage, SessionError> {
        match self.phase {
            Phase::Active | Phase::Finished => {}
            other => return Err(SessionError::NotActive(other)),
        }
        let (Some(game_id), Some(seat)) = (self.game_id.clone(), self.seat) else {
            return Err(SessionError::Unseated);
        };
        Ok(ClientMessage::Restart {
            game_id,
            player_id: seat,
        })
    }

    /// Applies one relay message.
    ///
    /// Absent fields leave the matching state untouched.
    #[instrument(skip(self, msg), fields(action = msg.action(), phase = %self.phase))]
    pub fn apply(&mut self, msg: ServerMessage) -> Notice {
        match msg {
            ServerMessage::SessionCreated {
                game_id,
                player_id,
                first_player,
            } => {
                self.adopt_seat(game_id, player_id.unwrap_or(Player::Cross));
                self.game.apply_names(first_player.as_deref(), None);
                self.phase = Phase::AwaitingPeer;
                info!(game_id = ?self.game_id, "Session created");
                Notice::Invite(self.game_id.clone().unwrap_or_default())
            }
            ServerMessage::SessionJoined {
                game_id,
                player_id,
                first_player,
                second_player,
            } => {
                self.adopt_seat(game_id, player_id.unwrap_or(Player::Circle));
                self.game
                    .apply_names(first_player.as_deref(), second_player.as_deref());
                self.phase = Phase::AwaitingPeer;
                info!(game_id = ?self.game_id, "Joined session");
                Notice::Joined(self.game_id.clone().unwrap_or_default())
            }
            ServerMessage::GameReady {
                first_player,
                second_player,
                player_turn,
            } => {
                self.game
                    .apply_names(first_player.as_deref(), second_player.as_deref());
                if let Some(player) = player_turn {
                    self.game.apply_turn(player);
                }
                self.phase = Phase::Active;
                info!("Both players present");
                Notice::Ready
            }
            ServerMessage::Play(update) => {
                self.apply_update(&update);
                if update.has_winner == Some(true) {
                    self.record_result(&update);
                }
                Notice::Updated
            }
            ServerMessage::Restart(update) => {
                self.game.reset();
                self.apply_update(&update);
                self.phase = Phase::Active;
                info!("Round restarted");
                Notice::Restarted
            }
            ServerMessage::WaitingPlayer {} => {
                debug!("Relay is still waiting for the second player");
                Notice::WaitingForOpponent
            }
            ServerMessage::Finished(update) => {
                self.apply_update(&update);
                self.record_result(&update);
                self.phase = Phase::Finished;
                info!(outcome = ?self.game.outcome(), "Round finished");
                Notice::RoundOver(*self.game.outcome())
            }
        }
    }

    fn adopt_seat(&mut self, game_id: Option<GameId>, seat: Player) {
        if let Some(id) = game_id {
            if self.game_id.as_ref().is_some_and(|known| *known != id) {
                warn!(known = ?self.game_id, announced = %id, "Relay reassigned session id");
            }
            self.game_id = Some(id);
        }
        self.seat = Some(seat);
    }

    /// Records an announced result.
    ///
    /// A missing `winningPlayer` is read off the board. Only an explicit
    /// `hasWinner: false`, or a drawn board when the flag is absent, counts
    /// as a draw; anything else leaves the outcome alone.
    fn record_result(&mut self, update: &GameUpdate) {
        if update.has_winner == Some(false) {
            self.game.apply_result(None, None);
            return;
        }
        let board = self.game.board();
        let winner = update
            .winning_player
            .or_else(|| rules::check_winner(board).map(|(player, _)| player));
        let drawn = rules::is_draw(board);
        match winner {
            Some(player) => self.game.apply_result(Some(player), update.winning_pattern),
            None if update.has_winner.is_none() && drawn => {
                self.game.apply_result(None, None)
            }
            None => warn!(
                has_winner = ?update.has_winner,
                "Result announced but no winner on the board, keeping outcome"
            ),
        }
    }

    fn apply_update(&mut self, update: &GameUpdate) {
        if let Some(moves) = &update.moves {
            self.game.apply_moves(moves.iter().map(|(pos, player)| (*pos, *player)));
        }
        if let Some(player) = update.player_turn {
            self.game.apply_turn(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noughts_game::{LINES, Square};

    fn host() -> GameSession {
        GameSession::new(Role::Host {
            name: "Ada".to_string(),
        })
    }

    fn active_host() -> GameSession {
        let mut session = host();
        session.open();
        session.apply(ServerMessage::SessionCreated {
            game_id: Some("g1".to_string()),
            player_id: Some(Player::Cross),
            first_player: Some("Ada".to_string()),
        });
        session.apply(ServerMessage::GameReady {
            first_player: Some("Ada".to_string()),
            second_player: Some("Grace".to_string()),
            player_turn: Some(Player::Cross),
        });
        session
    }

    #[test]
    fn test_fresh_session_applies_sparse_play() {
        let mut session = host();
        let msg = ServerMessage::decode(r#"{"action":"play","moves":{"0":0}}"#).unwrap();
        assert_eq!(session.apply(msg), Notice::Updated);

        let board = session.game().board();
        assert_eq!(board.get(Position::TopLeft), Square::Occupied(Player::Cross));
        assert!(Position::ALL[1..].iter().all(|p| board.is_empty(*p)));
    }

    #[test]
    fn test_lifecycle_host_to_active() {
        let mut session = host();
        assert_eq!(session.phase(), Phase::Uninitialized);

        let request = session.open();
        assert_eq!(
            request,
            ClientMessage::Create {
                first_player: "Ada".to_string()
            }
        );
        assert_eq!(session.phase(), Phase::AwaitingPeer);

        let notice = session.apply(ServerMessage::SessionCreated {
            game_id: Some("g1".to_string()),
            player_id: None,
            first_player: None,
        });
        assert_eq!(notice, Notice::Invite("g1".to_string()));
        assert_eq!(session.seat(), Some(Player::Cross));

        session.apply(ServerMessage::GameReady {
            first_player: None,
            second_player: Some("Grace".to_string()),
            player_turn: None,
        });
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.game().name(Player::Cross), "Ada");
        assert_eq!(session.game().name(Player::Circle), "Grace");
    }

    #[test]
    fn test_request_move_does_not_touch_board() {
        let session = active_host();
        let request = session.request_move(Position::Center).unwrap();

        assert_eq!(
            request,
            ClientMessage::Play {
                cell: Position::Center,
                player_id: Player::Cross,
                game_id: "g1".to_string()
            }
        );
        assert!(session.game().board().is_empty(Position::Center));
    }

    #[test]
    fn test_request_move_guards() {
        let mut session = host();
        assert_eq!(
            session.request_move(Position::Center),
            Err(SessionError::NotActive(Phase::Uninitialized))
        );

        session = active_host();
        session.apply(ServerMessage::Play(GameUpdate {
            moves: Some([(Position::Center, Player::Cross)].into()),
            player_turn: Some(Player::Circle),
            ..GameUpdate::default()
        }));
        assert_eq!(
            session.request_move(Position::TopLeft),
            Err(SessionError::Move(MoveError::WrongPlayer(Player::Cross)))
        );

        session.apply(ServerMessage::Play(GameUpdate {
            player_turn: Some(Player::Cross),
            ..GameUpdate::default()
        }));
        assert_eq!(
            session.request_move(Position::Center),
            Err(SessionError::Move(MoveError::SquareOccupied(Position::Center)))
        );
    }

    #[test]
    fn test_finished_records_winner_once() {
        let mut session = active_host();
        let update = GameUpdate {
            moves: Some(
                [
                    (Position::TopLeft, Player::Cross),
                    (Position::TopCenter, Player::Cross),
                    (Position::TopRight, Player::Cross),
                    (Position::Center, Player::Circle),
                    (Position::BottomLeft, Player::Circle),
                ]
                .into(),
            ),
            player_turn: Some(Player::Circle),
            has_winner: Some(true),
            winning_player: Some(Player::Cross),
            winning_pattern: Some(LINES[0]),
        };
        session.apply(ServerMessage::Play(update.clone()));
        let notice = session.apply(ServerMessage::Finished(update));

        assert_eq!(
            notice,
            Notice::RoundOver(Outcome::Win {
                player: Player::Cross,
                line: LINES[0]
            })
        );
        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.game().scores().wins(Player::Cross), 1);
        assert!(session.request_restart().is_ok());
    }

    fn top_row_for_cross() -> std::collections::BTreeMap<Position, Player> {
        [
            (Position::TopLeft, Player::Cross),
            (Position::TopCenter, Player::Cross),
            (Position::TopRight, Player::Cross),
        ]
        .into()
    }

    #[test]
    fn test_finished_without_winning_player_reads_board() {
        let mut session = active_host();
        let msg = ServerMessage::decode(
            r#"{"action":"finished","hasWinner":true,"moves":{"0":0,"1":0,"2":0}}"#,
        )
        .unwrap();

        let notice = session.apply(msg);
        assert_eq!(
            notice,
            Notice::RoundOver(Outcome::Win {
                player: Player::Cross,
                line: LINES[0]
            })
        );
        assert_eq!(session.game().scores().wins(Player::Cross), 1);
        assert_eq!(session.game().scores().draws(), 0);
    }

    #[test]
    fn test_play_with_winner_flag_only_reads_board() {
        let mut session = active_host();
        session.apply(ServerMessage::Play(GameUpdate {
            moves: Some(top_row_for_cross()),
            has_winner: Some(true),
            ..GameUpdate::default()
        }));
        assert_eq!(session.game().winner(), Some(Player::Cross));
        assert_eq!(session.game().scores().draws(), 0);
    }

    #[test]
    fn test_winner_flag_without_line_keeps_outcome() {
        let mut session = active_host();
        session.apply(ServerMessage::Finished(GameUpdate {
            moves: Some([(Position::Center, Player::Cross)].into()),
            has_winner: Some(true),
            ..GameUpdate::default()
        }));
        assert_eq!(session.game().outcome(), &Outcome::Pending);
        assert_eq!(session.game().scores().draws(), 0);
        assert_eq!(session.phase(), Phase::Finished);
    }

    #[test]
    fn test_finished_without_flag_on_open_board_is_not_a_draw() {
        let mut session = active_host();
        session.apply(ServerMessage::Finished(GameUpdate {
            moves: Some([(Position::Center, Player::Cross)].into()),
            ..GameUpdate::default()
        }));
        assert_eq!(session.game().outcome(), &Outcome::Pending);

        let mut session = active_host();
        session.apply(ServerMessage::Finished(GameUpdate {
            moves: Some(top_row_for_cross()),
            ..GameUpdate::default()
        }));
        assert_eq!(session.game().winner(), Some(Player::Cross));
    }

    #[test]
    fn test_restart_clears_board_and_reactivates() {
        let mut session = active_host();
        session.apply(ServerMessage::Finished(GameUpdate {
            moves: Some([(Position::Center, Player::Cross)].into()),
            has_winner: Some(false),
            ..GameUpdate::default()
        }));
        assert_eq!(session.game().outcome(), &Outcome::Draw);

        let notice = session.apply(ServerMessage::Restart(GameUpdate {
            player_turn: Some(Player::Cross),
            ..GameUpdate::default()
        }));
        assert_eq!(notice, Notice::Restarted);
        assert_eq!(session.phase(), Phase::Active);
        assert!(session.game().board().is_empty(Position::Center));
        assert_eq!(session.game().winner(), None);
        assert_eq!(session.game().scores().draws(), 1);
    }

    #[test]
    fn test_waiting_player_changes_nothing() {
        let mut session = active_host();
        let before = session.game().clone();
        assert_eq!(
            session.apply(ServerMessage::WaitingPlayer {}),
            Notice::WaitingForOpponent
        );
        assert_eq!(session.game(), &before);
    }
}

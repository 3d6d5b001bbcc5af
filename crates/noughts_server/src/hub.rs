//! Relay-side session management.
//!
//! The hub pairs two connections per session and keeps the authoritative
//! [`Game`]. Each connection owns an outbox channel; the hub answers and
//! broadcasts by pushing [`ServerMessage`]s into those outboxes.

use crate::protocol::{ClientMessage, GameId, GameUpdate, ServerMessage};
use derive_new::new;
use noughts_game::{Game, MoveError, Player, Position};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

/// Channel feeding one connection's socket.
pub type Outbox = UnboundedSender<ServerMessage>;

/// Why the hub dropped a client message.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum HubError {
    /// No session with this id.
    #[display("Session {} not found", _0)]
    UnknownSession(GameId),
    /// The guest seat is already taken.
    #[display("Session {} already has 2 players", _0)]
    SessionFull(GameId),
    /// The connection does not hold the seat it claims.
    #[display("Connection does not hold seat {} in session {}", _1, _0)]
    NotSeated(GameId, Player),
    /// The connection already holds a seat in this session.
    #[display("Connection already seated in session {}", _0)]
    AlreadySeated(GameId),
    /// The move was rejected by the game rules.
    #[display("Invalid move: {}", _0)]
    #[from]
    Move(MoveError),
    /// A previous holder of the session lock panicked.
    #[display("Session lock poisoned")]
    Poisoned,
}

impl std::error::Error for HubError {}

/// One relay connection and the seat it holds, if any.
#[derive(Debug, new)]
pub struct Connection {
    outbox: Outbox,
    #[new(default)]
    seat: Option<(GameId, Player)>,
}

impl Connection {
    /// Session and seat held by this connection.
    pub fn seat(&self) -> Option<&(GameId, Player)> {
        self.seat.as_ref()
    }

    fn send(&self, msg: ServerMessage) {
        if self.outbox.send(msg).is_err() {
            debug!("Connection outbox closed");
        }
    }
}

/// A paired game with up to two attached connections.
#[derive(Debug)]
pub struct RelaySession {
    /// Session ID.
    pub id: GameId,
    /// The authoritative game.
    pub game: Game,
    seats: [Option<Outbox>; 2],
}

impl RelaySession {
    #[instrument(skip(host))]
    fn new(id: GameId, host_name: &str, host: Outbox) -> Self {
        info!(session_id = %id, "Creating new relay session");
        Self {
            id,
            game: Game::with_names(host_name, noughts_game::DEFAULT_NAMES[1]),
            seats: [Some(host), None],
        }
    }

    /// True once both seats are filled.
    pub fn is_full(&self) -> bool {
        self.seats.iter().all(Option::is_some)
    }

    /// True while a guest holds the second seat.
    pub fn has_guest(&self) -> bool {
        self.seats[Self::seat_of(Player::Circle)].is_some()
    }

    fn seat_of(player: Player) -> usize {
        usize::from(player.id())
    }

    fn send_to(&self, player: Player, msg: ServerMessage) {
        if let Some(outbox) = &self.seats[Self::seat_of(player)]
            && outbox.send(msg).is_err()
        {
            debug!(session_id = %self.id, ?player, "Seat outbox closed");
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        debug!(session_id = %self.id, action = msg.action(), "Broadcasting");
        for player in Player::BOTH {
            self.send_to(player, msg.clone());
        }
    }
}

/// Manages all relay sessions.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    sessions: Arc<Mutex<HashMap<GameId, RelaySession>>>,
}

impl Hub {
    /// Creates an empty hub.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session hub");
        Self::default()
    }

    /// Lists all active session IDs.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Result<Vec<GameId>, HubError> {
        let sessions = self.sessions.lock().map_err(|_| HubError::Poisoned)?;
        Ok(sessions.keys().cloned().collect())
    }

    /// Runs one client message against the session it addresses.
    #[instrument(skip(self, conn, msg), fields(action = msg.action(), seat = ?conn.seat))]
    pub fn dispatch(&self, conn: &mut Connection, msg: ClientMessage) -> Result<(), HubError> {
        let mut sessions = self.sessions.lock().map_err(|_| HubError::Poisoned)?;

        if let ClientMessage::Create { .. } | ClientMessage::Join { .. } = msg
            && let Some((game_id, _)) = &conn.seat
        {
            warn!(%game_id, "Seated connection asked for another seat");
            return Err(HubError::AlreadySeated(game_id.clone()));
        }

        match msg {
            ClientMessage::Create { first_player } => {
                let id = loop {
                    let candidate = new_game_id();
                    if !sessions.contains_key(&candidate) {
                        break candidate;
                    }
                };
                let session = RelaySession::new(id.clone(), &first_player, conn.outbox.clone());
                sessions.insert(id.clone(), session);
                conn.seat = Some((id.clone(), Player::Cross));

                conn.send(ServerMessage::SessionCreated {
                    game_id: Some(id),
                    player_id: Some(Player::Cross),
                    first_player: Some(first_player),
                });
                Ok(())
            }
            ClientMessage::Join {
                game_id,
                second_player,
            } => {
                let session = sessions
                    .get_mut(&game_id)
                    .ok_or_else(|| HubError::UnknownSession(game_id.clone()))?;
                if session.has_guest() {
                    warn!(%game_id, "Session already has a second player");
                    return Err(HubError::SessionFull(game_id));
                }

                session.seats[RelaySession::seat_of(Player::Circle)] = Some(conn.outbox.clone());
                session.game.apply_names(None, Some(&second_player));
                conn.seat = Some((game_id.clone(), Player::Circle));
                info!(%game_id, name = %second_player, "Second player joined");

                let first_player = session.game.name(Player::Cross).to_string();
                conn.send(ServerMessage::SessionJoined {
                    game_id: Some(game_id),
                    player_id: Some(Player::Circle),
                    first_player: Some(first_player.clone()),
                    second_player: Some(second_player.clone()),
                });
                session.broadcast(ServerMessage::GameReady {
                    first_player: Some(first_player),
                    second_player: Some(second_player),
                    player_turn: Some(session.game.to_move()),
                });
                Ok(())
            }
            ClientMessage::Play {
                cell,
                player_id,
                game_id,
            } => {
                let session = seated_session(&mut sessions, conn, &game_id, player_id)?;
                if !session.is_full() {
                    debug!(%game_id, "Move before second player joined");
                    conn.send(ServerMessage::WaitingPlayer {});
                    return Ok(());
                }
                play(session, player_id, cell)
            }
            ClientMessage::Restart { game_id, player_id } => {
                let session = seated_session(&mut sessions, conn, &game_id, player_id)?;
                session.game.reset();
                info!(%game_id, ?player_id, "Round restarted");
                session.broadcast(ServerMessage::Restart(GameUpdate {
                    player_turn: Some(session.game.to_move()),
                    ..GameUpdate::default()
                }));
                Ok(())
            }
        }
    }

    /// Detaches a closed connection; drops the session once both seats are empty.
    #[instrument(skip(self, conn), fields(seat = ?conn.seat))]
    pub fn disconnect(&self, conn: &Connection) -> Result<(), HubError> {
        let Some((game_id, player)) = &conn.seat else {
            return Ok(());
        };
        let mut sessions = self.sessions.lock().map_err(|_| HubError::Poisoned)?;

        if let Some(session) = sessions.get_mut(game_id) {
            let seat = &mut session.seats[RelaySession::seat_of(*player)];
            if !seat.as_ref().is_some_and(|outbox| outbox.same_channel(&conn.outbox)) {
                warn!(%game_id, ?player, "Seat is held by another connection");
                return Ok(());
            }
            *seat = None;
            info!(%game_id, ?player, "Player left session");
            if session.seats.iter().all(Option::is_none) {
                sessions.remove(game_id);
                info!(%game_id, "Removed empty session");
            }
        }
        Ok(())
    }
}

fn seated_session<'a>(
    sessions: &'a mut HashMap<GameId, RelaySession>,
    conn: &Connection,
    game_id: &str,
    player: Player,
) -> Result<&'a mut RelaySession, HubError> {
    let holds_seat = conn
        .seat
        .as_ref()
        .is_some_and(|(id, seat)| id == game_id && *seat == player);
    if !holds_seat {
        warn!(game_id, ?player, "Message for a seat this connection does not hold");
        return Err(HubError::NotSeated(game_id.to_string(), player));
    }
    sessions
        .get_mut(game_id)
        .ok_or_else(|| HubError::UnknownSession(game_id.to_string()))
}

#[instrument(skip(session), fields(session_id = %session.id))]
fn play(session: &mut RelaySession, player: Player, cell: Position) -> Result<(), HubError> {
    let outcome = session.game.play_as(player, cell).map_err(|e| {
        warn!(?player, ?cell, error = %e, "Invalid move");
        e
    })?;

    info!(?player, ?cell, ?outcome, "Move accepted");
    debug!(board = %session.game.board().display(), "Board after move");

    let update = GameUpdate::snapshot(&session.game);
    session.broadcast(ServerMessage::Play(update.clone()));
    if outcome.is_over() {
        session.broadcast(ServerMessage::Finished(update));
    }
    Ok(())
}

fn new_game_id() -> GameId {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

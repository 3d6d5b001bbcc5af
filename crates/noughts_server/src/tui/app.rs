//! Application state behind the terminal UI.

use super::input::{Intent, interpret};
use super::render::View;
use crate::config::Settings;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{GameSession, Notice};
use crossterm::event::KeyEvent;
use noughts_game::{Game, Outcome, Player, Position};
use tracing::{debug, info, instrument};

/// Where moves go.
#[derive(Debug)]
enum Mode {
    /// Both players at this keyboard; moves apply immediately.
    Local(Game),
    /// Moves are sent to the relay and applied when echoed back.
    Networked {
        session: GameSession,
        settings: Settings,
    },
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    mode: Mode,
    cursor: Position,
    status: String,
    invite: Option<String>,
    alert: Option<String>,
    quit: bool,
}

impl App {
    /// Two players sharing this terminal.
    pub fn local(game: Game) -> Self {
        let mut app = Self::with_mode(Mode::Local(game));
        app.refresh_status();
        app
    }

    /// One side of a relayed game.
    pub fn networked(session: GameSession, settings: Settings) -> Self {
        let mut app = Self::with_mode(Mode::Networked { session, settings });
        app.status = "Connecting to relay...".to_string();
        app
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            cursor: Position::Center,
            status: String::new(),
            invite: None,
            alert: None,
            quit: false,
        }
    }

    /// The game being shown.
    pub fn game(&self) -> &Game {
        match &self.mode {
            Mode::Local(game) => game,
            Mode::Networked { session, .. } => session.game(),
        }
    }

    /// Status line text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Blocking notice, if one is up.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Invitation link, once the relay has opened our session.
    pub fn invite(&self) -> Option<&str> {
        self.invite.as_deref()
    }

    /// Whether the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Borrowed projection for the renderer.
    pub fn view(&self) -> View<'_> {
        let (seat, session_id) = match &self.mode {
            Mode::Local(_) => (None, None),
            Mode::Networked { session, .. } => (session.seat(), session.game_id()),
        };
        View {
            game: self.game(),
            cursor: self.cursor,
            status: &self.status,
            seat,
            session_id,
            invite: self.invite.as_deref(),
            alert: self.alert.as_deref(),
        }
    }

    /// The create or join request that opens a networked session.
    pub fn open(&mut self) -> Option<ClientMessage> {
        match &mut self.mode {
            Mode::Local(_) => None,
            Mode::Networked { session, .. } => Some(session.open()),
        }
    }

    /// Handles one key press, returning a message for the relay if the key
    /// produced one.
    #[instrument(skip(self), fields(code = ?key.code))]
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ClientMessage> {
        let intent = interpret(key, &mut self.cursor)?;
        if intent == Intent::Quit {
            info!("Quit requested");
            self.quit = true;
            return None;
        }
        if self.alert.take().is_some() {
            debug!("Alert dismissed");
            return None;
        }

        let outbound = match (&mut self.mode, intent) {
            (Mode::Local(game), Intent::Place(pos)) => {
                match game.play(pos) {
                    Ok(outcome) => debug!(?pos, ?outcome, "Move applied"),
                    Err(e) => debug!(error = %e, ?pos, "Move ignored"),
                }
                None
            }
            (Mode::Local(game), Intent::Replay) => {
                game.reset();
                None
            }
            (Mode::Networked { session, .. }, Intent::Place(pos)) => session
                .request_move(pos)
                .inspect_err(|e| debug!(error = %e, ?pos, "Move not sent"))
                .ok(),
            (Mode::Networked { session, .. }, Intent::Replay) => session
                .request_restart()
                .inspect_err(|e| debug!(error = %e, "Restart not sent"))
                .ok(),
            (_, Intent::Quit) => None,
        };
        if matches!(self.mode, Mode::Local(_)) {
            self.refresh_status();
        }
        outbound
    }

    /// Applies one relay message.
    #[instrument(skip(self, msg), fields(action = msg.action()))]
    pub fn handle_relay(&mut self, msg: ServerMessage) {
        let Mode::Networked { session, settings } = &mut self.mode else {
            debug!("Relay message in local mode ignored");
            return;
        };
        match session.apply(msg) {
            Notice::Invite(game_id) => {
                self.invite = Some(settings.invite_link(&game_id));
                self.status = format!("Session {game_id} open. Waiting for an opponent...");
            }
            Notice::Joined(game_id) => {
                self.status = format!("Joined session {game_id}. Waiting for the host...");
            }
            Notice::WaitingForOpponent => {
                self.alert = Some("Waiting for second player".to_string());
            }
            Notice::Ready => {
                self.alert = None;
                self.refresh_status();
            }
            Notice::Updated | Notice::Restarted | Notice::RoundOver(_) => self.refresh_status(),
        }
    }

    /// Records that the relay went away.
    pub fn relay_closed(&mut self) {
        info!("Relay connection closed");
        self.status = "Disconnected from relay. Press q to quit.".to_string();
    }

    fn refresh_status(&mut self) {
        let game = self.game();
        let status = match game.outcome() {
            Outcome::Win { player, .. } => {
                format!("{} wins! Press r to play again.", game.name(*player))
            }
            Outcome::Draw => "Draw! Press r to play again.".to_string(),
            Outcome::Pending => {
                let next = game.to_move();
                match self.seat() {
                    Some(seat) if seat == next => "Your move.".to_string(),
                    Some(_) => format!("Waiting for {}...", game.name(next)),
                    None => format!("{} ({}) to move.", game.name(next), next.mark()),
                }
            }
        };
        self.status = status;
    }

    fn seat(&self) -> Option<Player> {
        match &self.mode {
            Mode::Local(_) => None,
            Mode::Networked { session, .. } => session.seat(),
        }
    }
}

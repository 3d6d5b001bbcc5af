//! Terminal UI for local and networked games.

mod app;
mod input;
mod render;

pub use app::App;
pub use input::{Intent, interpret, move_cursor};
pub use render::{View, draw};

use crate::config::Settings;
use crate::relay_client::{self, RelayReceiver, RelaySender};
use crate::session::{GameSession, Role};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use noughts_game::Game;
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Plays a local game on this terminal until the players quit.
#[instrument(skip(game), fields(first = %game.name(noughts_game::Player::Cross)))]
pub async fn run_local(game: Game) -> Result<()> {
    info!("Starting local game");
    let mut app = App::local(game);
    let mut keys = spawn_key_reader();

    let mut screen = Screen::enter()?;
    let res = async {
        loop {
            screen.terminal.draw(|f| draw(f, &app.view()))?;
            let Some(key) = keys.recv().await else {
                break;
            };
            app.handle_key(key);
            if app.should_quit() {
                break;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    screen.leave()?;

    if let Err(e) = &res {
        error!(error = ?e, "Game loop error");
    }
    let scores = app.game().scores();
    info!(?scores, "Local game finished");
    res
}

/// Plays one side of a relayed game until the player quits.
///
/// Fails before touching the terminal when the relay cannot be reached.
#[instrument(skip(settings))]
pub async fn run_networked(settings: Settings, role: Role) -> Result<()> {
    let (sender, receiver) = relay_client::connect(settings.relay_url())
        .await
        .with_context(|| {
            format!(
                "Multiplayer unavailable: could not reach the relay at {}",
                settings.relay_url()
            )
        })?;

    let app = App::networked(GameSession::new(role), settings);
    let keys = spawn_key_reader();

    let mut screen = Screen::enter()?;
    let res = drive_networked(&mut screen.terminal, app, keys, sender, receiver).await;
    screen.leave()?;

    if let Err(e) = &res {
        error!(error = ?e, "Game loop error");
    }
    res
}

/// Event loop for a networked game: key presses become relay messages,
/// relay messages mutate the session.
#[instrument(skip_all)]
async fn drive_networked<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut keys: mpsc::UnboundedReceiver<KeyEvent>,
    mut sender: RelaySender,
    mut receiver: RelayReceiver,
) -> Result<()>
where
    <B as Backend>::Error: Send + Sync + 'static,
{
    if let Some(open) = app.open() {
        sender.send(&open).await?;
    }
    let mut connected = true;

    loop {
        terminal.draw(|f| draw(f, &app.view()))?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break };
                if let Some(msg) = app.handle_key(key)
                    && connected
                    && let Err(e) = sender.send(&msg).await
                {
                    warn!(error = %e, "Failed to send to relay");
                }
                if app.should_quit() {
                    break;
                }
            }
            msg = receiver.next_message(), if connected => match msg {
                Ok(Some(msg)) => app.handle_relay(msg),
                Ok(None) => {
                    connected = false;
                    app.relay_closed();
                }
                Err(e) => {
                    warn!(error = %e, "Relay connection failed");
                    connected = false;
                    app.relay_closed();
                }
            },
        }
    }

    if connected && let Err(e) = sender.close().await {
        warn!(error = %e, "Failed to close relay connection");
    }
    Ok(())
}

/// Forwards key presses from a blocking poll thread.
///
/// The thread exits once the receiver is dropped.
fn spawn_key_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                        if tx.send(key).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to poll terminal events");
                    break;
                }
            }
        }
    });
    rx
}

/// Raw-mode alternate screen, restored on [`Screen::leave`] or drop.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Screen {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn leave(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            error!(error = %e, "Failed to restore terminal");
        }
    }
}

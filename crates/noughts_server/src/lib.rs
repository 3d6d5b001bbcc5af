//! Noughts terminal client and relay.
//!
//! # Architecture
//!
//! - **Protocol**: tagged JSON messages exchanged with the relay
//! - **Session**: client-side state of one networked game
//! - **Hub / Relay**: the axum WebSocket relay pairing two players per session
//! - **Relay client**: tokio-tungstenite connection to the relay
//! - **TUI**: ratatui front end for local and networked play
//!
//! # Example
//!
//! ```no_run
//! use noughts_server::{Hub, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! serve(listener, Hub::new()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod hub;
mod protocol;
mod relay;
mod relay_client;
mod session;
mod tui;

pub use config::{ConfigError, INVITE_TEMPLATE_VAR, RELAY_URL_VAR, Settings};
pub use hub::{Connection, Hub, HubError, Outbox, RelaySession};
pub use protocol::{ClientMessage, GameId, GameUpdate, ServerMessage};
pub use relay::{router, serve};
pub use relay_client::{RelayError, RelayReceiver, RelaySender, connect};
pub use session::{GameSession, Notice, Phase, Role, SessionError};
pub use tui::{App, Intent, View, draw, interpret, move_cursor, run_local, run_networked};

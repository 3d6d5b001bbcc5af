//! Noughts - unified CLI
//!
//! Local play, networked play through a relay, and the relay itself.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use noughts_game::Game;
use noughts_server::{Hub, Role, Settings};
use std::path::Path;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;
    let [first_default, second_default] = settings.default_names().clone();

    match cli.command {
        Command::Local { first, second } => {
            init_file_tracing(settings.log_file())?;
            let game = Game::with_names(
                first.unwrap_or(first_default),
                second.unwrap_or(second_default),
            );
            noughts_server::run_local(game).await
        }
        Command::Host { name, relay_url } => {
            init_file_tracing(settings.log_file())?;
            if let Some(url) = relay_url {
                settings.set_relay_url(url);
            }
            let role = Role::Host {
                name: name.unwrap_or(first_default),
            };
            noughts_server::run_networked(settings, role).await
        }
        Command::Join {
            game_id,
            name,
            relay_url,
        } => {
            init_file_tracing(settings.log_file())?;
            if let Some(url) = relay_url {
                settings.set_relay_url(url);
            }
            let role = Role::Guest {
                game_id,
                name: name.unwrap_or(second_default),
            };
            noughts_server::run_networked(settings, role).await
        }
        Command::Relay { host, port } => {
            init_stdout_tracing();
            let host = host.unwrap_or_else(|| settings.bind_host().clone());
            let port = port.unwrap_or(*settings.bind_port());
            run_relay(host, port).await
        }
    }
}

/// Run the WebSocket relay
#[instrument]
async fn run_relay(host: String, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind relay to {host}:{port}"))?;
    info!("Relay ready at ws://{}:{}/ws", host, port);
    noughts_server::serve(listener, Hub::new()).await
}

/// Relay logs go to stdout.
fn init_stdout_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,noughts_server=debug")),
        )
        .init();
}

/// Interactive modes log to a file so the board stays readable.
fn init_file_tracing(path: &Path) -> Result<()> {
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

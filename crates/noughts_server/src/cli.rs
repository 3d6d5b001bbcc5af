//! Command-line interface for noughts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Noughts - tic-tac-toe in the terminal, locally or over a relay
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Tic-tac-toe for two players, on one terminal or two", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the settings file
    #[arg(long, global = true, default_value = "noughts.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two players share this terminal
    Local {
        /// Name of the first player (X)
        #[arg(long)]
        first: Option<String>,

        /// Name of the second player (O)
        #[arg(long)]
        second: Option<String>,
    },

    /// Open a networked session and wait for a guest
    Host {
        /// Your display name
        #[arg(long)]
        name: Option<String>,

        /// Relay WebSocket URL (overrides the settings file)
        #[arg(long)]
        relay_url: Option<String>,
    },

    /// Join a networked session by id
    Join {
        /// Session id shared by the host
        game_id: String,

        /// Your display name
        #[arg(long)]
        name: Option<String>,

        /// Relay WebSocket URL (overrides the settings file)
        #[arg(long)]
        relay_url: Option<String>,
    },

    /// Run the relay server
    Relay {
        /// Host to bind to (overrides the settings file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the settings file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

//! Client and relay settings.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Environment variable overriding [`Settings::relay_url`].
pub const RELAY_URL_VAR: &str = "NOUGHTS_RELAY_URL";
/// Environment variable overriding [`Settings::invite_template`].
pub const INVITE_TEMPLATE_VAR: &str = "NOUGHTS_INVITE_TEMPLATE";

/// Settings read from `noughts.toml`.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// WebSocket address of the relay.
    relay_url: String,

    /// Invitation link pattern; `{game_id}` is replaced by the session id.
    invite_template: String,

    /// Address the relay binds to.
    bind_host: String,

    /// Port the relay binds to.
    bind_port: u16,

    /// Names used when none are given on the command line.
    default_names: [String; 2],

    /// Log destination for the interactive modes.
    log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:3000/ws".to_string(),
            invite_template: "http://127.0.0.1:3000/?game={game_id}".to_string(),
            bind_host: "127.0.0.1".to_string(),
            bind_port: 3000,
            default_names: noughts_game::DEFAULT_NAMES.map(str::to_string),
            log_file: PathBuf::from("noughts.log"),
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(relay_url = %settings.relay_url, "Settings loaded");
        Ok(settings)
    }

    /// Loads `path` if it exists, otherwise defaults, then applies the
    /// environment overrides.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = if path.exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };
        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides from `lookup`, keyed by environment variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(RELAY_URL_VAR) {
            debug!(%url, "Relay url overridden");
            self.relay_url = url;
        }
        if let Some(template) = lookup(INVITE_TEMPLATE_VAR) {
            debug!(%template, "Invite template overridden");
            self.invite_template = template;
        }
        self
    }

    /// Replaces the relay address.
    pub fn set_relay_url(&mut self, url: impl Into<String>) {
        self.relay_url = url.into();
    }

    /// Link a guest follows to join `game_id`.
    pub fn invite_link(&self, game_id: &str) -> String {
        self.invite_template.replace("{game_id}", game_id)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_link_substitutes_game_id() {
        let settings = Settings::default();
        assert_eq!(
            settings.invite_link("ab12cd34"),
            "http://127.0.0.1:3000/?game=ab12cd34"
        );
    }

    #[test]
    fn test_overrides_replace_only_present_keys() {
        let settings = Settings::default().with_overrides(|key| {
            (key == RELAY_URL_VAR).then(|| "ws://relay.example:9000/ws".to_string())
        });
        assert_eq!(settings.relay_url(), "ws://relay.example:9000/ws");
        assert_eq!(
            settings.invite_template(),
            Settings::default().invite_template()
        );
    }
}

//! Relay wire protocol.
//!
//! Every frame is a JSON object tagged by its `action` field, with camelCase
//! payload fields. Players travel as their numeric id and cells as their
//! index, so `{"action":"play","moves":{"0":0}}` reads "cell 0 belongs to the
//! first player".

use noughts_game::{Game, Line, Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// Session identifier shared by both players.
pub type GameId = String;

/// Messages a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new session as the first player.
    #[serde(rename_all = "camelCase")]
    Create {
        /// Host's display name.
        first_player: String,
    },
    /// Take the second seat of an existing session.
    #[serde(rename_all = "camelCase")]
    Join {
        /// Session to join.
        game_id: GameId,
        /// Guest's display name.
        second_player: String,
    },
    /// Claim a cell.
    #[serde(rename_all = "camelCase")]
    Play {
        /// Cell index (0-8).
        #[serde(rename = "move")]
        cell: Position,
        /// Seat of the sender.
        player_id: Player,
        /// Session the move belongs to.
        game_id: GameId,
    },
    /// Clear the board for another round.
    #[serde(rename_all = "camelCase")]
    Restart {
        /// Session to restart.
        game_id: GameId,
        /// Seat of the sender.
        player_id: Player,
    },
}

/// Board state carried by `play`, `restart` and `finished`.
///
/// Absent fields mean "no change".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    /// Every owned cell, keyed by index.
    #[serde(default, with = "cell_map", skip_serializing_if = "Option::is_none")]
    pub moves: Option<BTreeMap<Position, Player>>,
    /// Player to move next.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_turn: Option<Player>,
    /// Whether the round has a winner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_winner: Option<bool>,
    /// The winner, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_player: Option<Player>,
    /// The completed line, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_pattern: Option<Line>,
}

impl GameUpdate {
    /// Full snapshot of `game` as the relay broadcasts it.
    #[instrument(skip(game))]
    pub fn snapshot(game: &Game) -> Self {
        Self {
            moves: Some(game.board().owned().collect()),
            player_turn: Some(game.to_move()),
            has_winner: Some(game.winner().is_some()),
            winning_player: game.winner(),
            winning_pattern: game.winning_line(),
        }
    }
}

/// `moves` object codec.
///
/// JSON object keys are strings, and internally tagged enums buffer their
/// content, so the keys are parsed by hand instead of through `Position`'s
/// numeric impl.
mod cell_map {
    use noughts_game::{Player, Position};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        moves: &Option<BTreeMap<Position, Player>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match moves {
            Some(moves) => serializer.collect_map(
                moves
                    .iter()
                    .map(|(pos, player)| (pos.to_index().to_string(), *player)),
            ),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BTreeMap<Position, Player>>, D::Error> {
        let Some(raw) = Option::<BTreeMap<String, Player>>::deserialize(deserializer)? else {
            return Ok(None);
        };
        raw.into_iter()
            .map(|(key, player)| {
                key.trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(|index| Position::try_from(index).ok())
                    .map(|pos| (pos, player))
                    .ok_or_else(|| D::Error::custom(format!("invalid cell index {key:?}")))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Some)
    }
}

/// Messages the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A `create` succeeded; the sender holds the first seat.
    #[serde(rename_all = "camelCase")]
    SessionCreated {
        /// New session id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_id: Option<GameId>,
        /// Seat assigned to the receiver.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<Player>,
        /// Host's display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_player: Option<String>,
    },
    /// A `join` succeeded; the sender holds the second seat.
    #[serde(rename_all = "camelCase")]
    SessionJoined {
        /// Joined session id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_id: Option<GameId>,
        /// Seat assigned to the receiver.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<Player>,
        /// Host's display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_player: Option<String>,
        /// Guest's display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_player: Option<String>,
    },
    /// Both seats are taken; play can start.
    #[serde(rename_all = "camelCase")]
    GameReady {
        /// Host's display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_player: Option<String>,
        /// Guest's display name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second_player: Option<String>,
        /// Player to move.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_turn: Option<Player>,
    },
    /// A move was accepted.
    Play(GameUpdate),
    /// The board was cleared.
    Restart(GameUpdate),
    /// A move arrived before the second player joined.
    WaitingPlayer {},
    /// The round ended.
    Finished(GameUpdate),
}

impl ServerMessage {
    /// The `action` tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            ServerMessage::SessionCreated { .. } => "session_created",
            ServerMessage::SessionJoined { .. } => "session_joined",
            ServerMessage::GameReady { .. } => "game_ready",
            ServerMessage::Play(_) => "play",
            ServerMessage::Restart(_) => "restart",
            ServerMessage::WaitingPlayer {} => "waiting_player",
            ServerMessage::Finished(_) => "finished",
        }
    }

    /// Parses one text frame.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Renders one text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ClientMessage {
    /// The `action` tag, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            ClientMessage::Create { .. } => "create",
            ClientMessage::Join { .. } => "join",
            ClientMessage::Play { .. } => "play",
            ClientMessage::Restart { .. } => "restart",
        }
    }

    /// Parses one text frame.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Renders one text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_play_request_wire_shape() {
        let msg = ClientMessage::Play {
            cell: Position::Center,
            player_id: Player::Circle,
            game_id: "abc".to_string(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"action": "play", "move": 4, "playerId": 1, "gameId": "abc"})
        );
    }

    #[test]
    fn test_play_update_decodes_sparse_moves() {
        let msg = ServerMessage::decode(r#"{"action":"play","moves":{"0":0}}"#).unwrap();
        let ServerMessage::Play(update) = msg else {
            panic!("expected play, got {msg:?}");
        };
        let moves = update.moves.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves.get(&Position::TopLeft), Some(&Player::Cross));
        assert_eq!(update.player_turn, None);
    }

    #[test]
    fn test_snapshot_encodes_winner() {
        let mut game = Game::new();
        for index in [0, 3, 1, 4, 2] {
            game.play(Position::from_index(index).unwrap()).unwrap();
        }
        let text = ServerMessage::Finished(GameUpdate::snapshot(&game))
            .encode()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["action"], "finished");
        assert_eq!(value["hasWinner"], true);
        assert_eq!(value["winningPlayer"], 0);
        assert_eq!(value["winningPattern"], json!([0, 1, 2]));
        assert_eq!(value["moves"]["3"], 1);
    }

    #[test]
    fn test_waiting_player_ignores_extra_fields() {
        let msg = ServerMessage::decode(r#"{"action":"waiting_player","gameId":"x"}"#).unwrap();
        assert_eq!(msg, ServerMessage::WaitingPlayer {});
    }

    #[test]
    fn test_off_board_cell_is_rejected() {
        assert!(ServerMessage::decode(r#"{"action":"play","moves":{"9":0}}"#).is_err());
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(ServerMessage::decode(r#"{"action":"teleport"}"#).is_err());
        assert!(ServerMessage::decode(r#"{"moves":{}}"#).is_err());
    }
}

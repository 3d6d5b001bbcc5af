//! WebSocket client for the relay.

use crate::protocol::{ClientMessage, ServerMessage};
use derive_more::{Display, Error};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Relay transport error.
#[derive(Debug, Clone, Display, Error)]
#[display("Relay error: {} at {}:{}", message, file, line)]
pub struct RelayError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RelayError {
    /// Creates a new relay error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RelayError {
    #[track_caller]
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::new(format!("Websocket error: {}", err))
    }
}

impl From<serde_json::Error> for RelayError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Encoding error: {}", err))
    }
}

/// Outbound half of a relay connection.
pub struct RelaySender {
    sink: SplitSink<Socket, Message>,
}

/// Inbound half of a relay connection.
pub struct RelayReceiver {
    stream: SplitStream<Socket>,
}

/// Opens a connection to the relay at `url`.
#[instrument]
pub async fn connect(url: &str) -> Result<(RelaySender, RelayReceiver), RelayError> {
    info!("Connecting to relay");
    let (socket, response) = connect_async(url).await?;
    debug!(status = %response.status(), "Relay handshake complete");

    let (sink, stream) = socket.split();
    Ok((RelaySender { sink }, RelayReceiver { stream }))
}

impl RelaySender {
    /// Sends one message. There is no acknowledgement.
    #[instrument(skip(self, msg), fields(action = msg.action()))]
    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), RelayError> {
        let text = msg.encode()?;
        debug!(frame = %text, "Sending");
        self.sink.send(Message::text(text)).await?;
        Ok(())
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), RelayError> {
        self.sink.close().await?;
        Ok(())
    }
}

impl RelayReceiver {
    /// Waits for the next well-formed relay message.
    ///
    /// Malformed frames are logged and skipped. Returns `Ok(None)` once the
    /// relay closes the connection.
    #[instrument(skip(self))]
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>, RelayError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match ServerMessage::decode(text.as_str()) {
                    Ok(msg) => {
                        debug!(action = msg.action(), "Received");
                        return Ok(Some(msg));
                    }
                    Err(e) => warn!(error = %e, frame = %text.as_str(), "Skipping malformed relay message"),
                },
                Message::Close(_) => {
                    info!("Relay closed the connection");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }
}

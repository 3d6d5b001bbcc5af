//! WebSocket relay server.
//!
//! One task per connection reads client frames and dispatches them against
//! the shared [`Hub`]; a companion task drains the connection's outbox into
//! the socket.

use crate::hub::{Connection, Hub};
use crate::protocol::{ClientMessage, GameId, ServerMessage};
use anyhow::Result;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Json, Router};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Builds the relay router: `/ws` for players, `/health` for liveness,
/// `/sessions` for the ids of open sessions.
#[instrument(skip(hub))]
pub fn router(hub: Hub) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/health", get(|| async { "ok" }))
        .route("/sessions", get(sessions))
        .with_state(hub)
}

/// Serves the relay on an already bound listener until the server stops.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve(listener: TcpListener, hub: Hub) -> Result<()> {
    info!("Relay accepting connections");
    axum::serve(listener, router(hub)).await?;
    info!("Relay stopped");
    Ok(())
}

async fn sessions(State(hub): State<Hub>) -> Result<Json<Vec<GameId>>, StatusCode> {
    let mut ids = hub.list_sessions().map_err(|e| {
        warn!(error = %e, "Failed to list sessions");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    ids.sort();
    Ok(Json(ids))
}

async fn upgrade(ws: WebSocketUpgrade, State(hub): State<Hub>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, hub: Hub) {
    info!("Player connected");
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let writer = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let text = match msg.encode() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, action = msg.action(), "Failed to encode message");
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                debug!(error = %e, "Socket closed while sending");
                break;
            }
        }
    });

    let mut conn = Connection::new(outbox);
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::decode(text.as_str()) {
                Ok(msg) => {
                    if let Err(e) = hub.dispatch(&mut conn, msg) {
                        warn!(error = %e, "Dropped client message");
                    }
                }
                Err(e) => warn!(error = %e, frame = %text.as_str(), "Malformed client message"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Websocket error");
                break;
            }
        }
    }

    info!(seat = ?conn.seat(), "Player disconnected");
    if let Err(e) = hub.disconnect(&conn) {
        warn!(error = %e, "Failed to detach connection");
    }
    writer.abort();
}

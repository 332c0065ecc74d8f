//! WebSocket handler for client connections.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{Sink, SinkExt, StreamExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::api::AppState;

use super::coordinator::SessionCoordinator;
use super::hub::WsHub;
use super::types::{ClientCommand, ServerEvent};

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// WebSocket upgrade handler.
///
/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    let coordinator = state.coordinator.clone();
    ws.on_upgrade(move |socket| handle_ws_connection(socket, hub, coordinator))
}

/// Handle a WebSocket connection for its whole lifetime.
async fn handle_ws_connection(
    socket: WebSocket,
    hub: Arc<WsHub>,
    coordinator: Arc<SessionCoordinator>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut event_rx) = hub.register_connection();

    let connected = ServerEvent::Connected {
        id: conn_id.clone(),
    };
    if let Err(e) = send_event(&mut sender, &connected).await {
        warn!("Failed to send connected message to {}: {}", conn_id, e);
        hub.unregister_connection(&conn_id);
        return;
    }

    // Spawn task to send events to client
    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        // The first tick fires immediately; skip it.
        ping_interval.tick().await;

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else { break };
                    if send_event(&mut sender, &event).await.is_err() {
                        break;
                    }
                }

                _ = ping_interval.tick() => {
                    if send_event(&mut sender, &ServerEvent::Ping).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Process incoming messages
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(text.as_str()) {
                Ok(cmd) => coordinator.handle(&conn_id, cmd).await,
                Err(e) => {
                    warn!(
                        "Failed to parse command from {}: {} - {}",
                        conn_id,
                        e,
                        text.as_str()
                    );
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("Received binary message from {}, ignoring", conn_id);
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!("Connection {} closed", conn_id);
                break;
            }
            Err(e) => {
                warn!("WebSocket error for {}: {}", conn_id, e);
                break;
            }
        }
    }

    // Clean up
    coordinator.disconnect(&conn_id).await;
    hub.unregister_connection(&conn_id);
    send_task.abort();
    info!("WebSocket connection {} finished", conn_id);
}

async fn send_event<S>(sender: &mut S, event: &ServerEvent) -> anyhow::Result<()>
where
    S: Sink<Message> + Unpin,
    <S as Sink<Message>>::Error: std::error::Error + Send + Sync + 'static,
{
    let json = serde_json::to_string(event)?;
    sender.send(Message::Text(json.into())).await?;
    Ok(())
}

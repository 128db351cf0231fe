use super::AppState;
use crate::hub::MallHub;
use crate::protocol::{PushEvent, PushMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// GET /api/ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("WebSocket upgrade request received");
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(|socket| handle_socket(socket, hub))
}

/// Handle WebSocket connection lifecycle.
///
/// The client gets `full_state` first, then every push event in order. A
/// client that falls behind the broadcast buffer is resynced with a fresh
/// `full_state`.
async fn handle_socket(mut socket: WebSocket, hub: Arc<MallHub>) {
    info!("WebSocket connection established");

    let (snapshot, mut events_rx) = hub.subscribe_with_snapshot();
    if let Err(e) = send_event(&mut socket, &PushEvent::FullState(snapshot)).await {
        error!(error = %e, "Failed to send initial state");
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Clients have nothing to say on this channel
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            result = events_rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut socket, &event).await {
                            error!(error = %e, "Failed to send push event");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "WebSocket lagged, resyncing with full state");
                        let (snapshot, rx) = hub.subscribe_with_snapshot();
                        events_rx = rx;
                        if let Err(e) = send_event(&mut socket, &PushEvent::FullState(snapshot)).await {
                            error!(error = %e, "Failed to resync client");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Push broadcast channel closed");
                        break;
                    }
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

async fn send_event(socket: &mut WebSocket, event: &PushEvent) -> anyhow::Result<()> {
    let msg = PushMessage::from_event(event)?;
    let json = serde_json::to_string(&msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}

use crate::channel::ChannelEvent;
use crate::protocol::parse_push;
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

/// Websocket connection to the hub with reconnect.
///
/// Events are queued with backpressure, so none are dropped or reordered.
/// After every reconnect the hub opens with a fresh `full_state`.
pub struct RealtimeChannel {
    events: mpsc::Receiver<ChannelEvent>,
    task: JoinHandle<()>,
}

impl RealtimeChannel {
    /// Start connecting to `url` (`ws://host/api/ws`).
    pub fn connect(url: String, reconnect_delay: Duration) -> Self {
        let (tx, events) = mpsc::channel(256);
        let task = tokio::spawn(run_connection(url, reconnect_delay, tx));
        Self { events, task }
    }

    /// Next event; `None` once the connection task has stopped.
    pub async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_connection(url: String, reconnect_delay: Duration, tx: mpsc::Sender<ChannelEvent>) {
    loop {
        let reason = match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!(url = %url, "Connected to hub");
                if tx.send(ChannelEvent::Connected).await.is_err() {
                    return;
                }
                match forward_frames(stream, &tx).await {
                    Some(reason) => reason,
                    // Receiver dropped: session is over
                    None => return,
                }
            }
            Err(e) => {
                warn!(error = %e, url = %url, "Failed to connect to hub");
                e.to_string()
            }
        };

        if tx.send(ChannelEvent::Disconnected { reason }).await.is_err() {
            return;
        }
        debug!(delay_ms = reconnect_delay.as_millis() as u64, "Reconnecting after delay");
        tokio::time::sleep(reconnect_delay).await;
    }
}

/// Forward decoded frames until the socket ends.
///
/// Returns the disconnect reason, or `None` when the receiver is gone.
async fn forward_frames<S>(mut stream: S, tx: &mpsc::Sender<ChannelEvent>) -> Option<String>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match parse_push(text.as_str()) {
                Ok(frame) => {
                    if tx.send(ChannelEvent::Push(frame)).await.is_err() {
                        return None;
                    }
                }
                Err(e) => warn!(error = %e, "Skipping malformed push frame"),
            },
            Ok(Message::Close(_)) => return Some("closed by hub".to_string()),
            Ok(_) => {
                // Ignore binary, ping and pong frames
            }
            Err(e) => return Some(e.to_string()),
        }
    }
    Some("stream ended".to_string())
}

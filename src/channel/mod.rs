// Realtime channel client

#[cfg(feature = "native")]
pub mod ws;

use crate::protocol::PushFrame;

/// Path of the hub's websocket endpoint
pub const WS_PATH: &str = "/api/ws";

/// What the channel hands to the dashboard, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Connection (re-)established; diagnostics only
    Connected,
    /// Decoded push frame
    Push(PushFrame),
    /// Connection lost; a reconnect follows
    Disconnected { reason: String },
}

/// Websocket URL for a hub base URL (`http://host` -> `ws://host/api/ws`).
pub fn ws_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let rest = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("ws://{}", base)
    };
    format!("{}{}", rest, WS_PATH)
}

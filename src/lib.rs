// Configuration (TOML + env overrides)
pub mod config;

// Mall state model and client-side state store
pub mod state;

// Push event envelope and outbound request types
pub mod protocol;

// Realtime channel client
pub mod channel;

// Pure view renderers and the chart sink adapter
pub mod view;

// Dashboard session: store + retained views
pub mod dashboard;

// Outbound actions (toggle, upload)
pub mod dispatch;

// Rule-based dialogue engine
pub mod dialogue;

// Speech capability traits and narration
pub mod speech;

// Chat transcript and chat session
pub mod chat;

// Mall hub: authoritative state + broadcast
#[cfg(feature = "native")]
pub mod hub;

// HTTP and WebSocket APIs of the hub
#[cfg(feature = "native")]
pub mod api;

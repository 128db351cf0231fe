// Push event envelope (hub -> client) and outbound request bodies

use crate::state::{MallAnalytics, MallState, ParkingMap, SlotStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const FULL_STATE: &str = "full_state";
pub const PARKING_UPDATE: &str = "parking_update";
pub const MALL_UPDATE: &str = "mall_update";

/// Typed push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// Complete snapshot; replaces everything held locally
    FullState(MallState),
    /// Full replacement of the `parking` sub-field
    ParkingUpdate(ParkingMap),
    /// Full replacement of the `mall` sub-field
    MallUpdate(MallAnalytics),
}

impl PushEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            PushEvent::FullState(_) => FULL_STATE,
            PushEvent::ParkingUpdate(_) => PARKING_UPDATE,
            PushEvent::MallUpdate(_) => MALL_UPDATE,
        }
    }
}

/// Decoded frame: event plus optional server timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PushFrame {
    pub event: PushEvent,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Wire envelope: `{"type": ..., "data": ..., "timestamp": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl PushMessage {
    /// Build a timestamped envelope for `event`.
    pub fn from_event(event: &PushEvent) -> serde_json::Result<Self> {
        let data = match event {
            PushEvent::FullState(state) => serde_json::to_value(state)?,
            PushEvent::ParkingUpdate(parking) => serde_json::to_value(parking)?,
            PushEvent::MallUpdate(mall) => serde_json::to_value(mall)?,
        };
        Ok(Self {
            msg_type: event.kind().to_string(),
            data,
            timestamp: Some(Utc::now()),
        })
    }
}

/// Protocol errors for inbound frames
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    InvalidJson(String),
    UnknownEvent(String),
    InvalidPayload { event: String, reason: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidJson(e) => write!(f, "frame is not a valid envelope: {}", e),
            ProtocolError::UnknownEvent(t) => write!(f, "unknown event type '{}'", t),
            ProtocolError::InvalidPayload { event, reason } => {
                write!(f, "invalid '{}' payload: {}", event, reason)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Decode one text frame.
///
/// A `null` or missing `data` decodes to the empty value of the event's
/// payload type, so a bare `mall_update` clears the mall analytics.
pub fn parse_push(text: &str) -> Result<PushFrame, ProtocolError> {
    let msg: PushMessage =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let event = match msg.msg_type.as_str() {
        FULL_STATE => PushEvent::FullState(decode_payload(&msg.msg_type, msg.data)?),
        PARKING_UPDATE => PushEvent::ParkingUpdate(decode_payload(&msg.msg_type, msg.data)?),
        MALL_UPDATE => PushEvent::MallUpdate(decode_payload(&msg.msg_type, msg.data)?),
        other => return Err(ProtocolError::UnknownEvent(other.to_string())),
    };

    Ok(PushFrame {
        event,
        timestamp: msg.timestamp,
    })
}

fn decode_payload<T>(event: &str, data: Value) -> Result<T, ProtocolError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| ProtocolError::InvalidPayload {
        event: event.to_string(),
        reason: e.to_string(),
    })
}

/// Client -> hub: `POST /api/toggle_parking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub slot: String,
    pub status: SlotStatus,
}

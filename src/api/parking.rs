use super::{AppError, AppState};
use crate::hub::HubError;
use crate::state::ParkingMap;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Toggle request body. A requested `status` is accepted but not used:
/// the hub always flips the current value.
#[derive(Deserialize)]
pub(super) struct ToggleParkingBody {
    #[serde(default)]
    slot: Option<Value>,
}

/// Slot key from the request: strings as-is, numbers in their decimal form.
fn slot_key(slot: Option<Value>) -> Result<String, HubError> {
    match slot {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        other => Err(HubError::InvalidSlot(
            other.map(|v| v.to_string()).unwrap_or_default(),
        )),
    }
}

#[derive(Serialize)]
pub(super) struct ToggleParkingResponse {
    success: bool,
    state: ParkingMap,
}

/// POST /api/toggle_parking - Flip one slot
pub(super) async fn toggle_parking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ToggleParkingBody>,
) -> Result<Json<ToggleParkingResponse>, AppError> {
    let slot = slot_key(body.slot)?;
    let parking = state.hub.toggle_slot(&slot)?;
    Ok(Json(ToggleParkingResponse {
        success: true,
        state: parking,
    }))
}

use super::AppState;
use crate::state::MallAnalytics;
use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// POST /api/mall_update - Analytics from the external analyzer
pub(super) async fn mall_update(
    State(state): State<Arc<AppState>>,
    Json(mall): Json<MallAnalytics>,
) -> Json<Value> {
    state.hub.publish_mall(mall);
    Json(json!({ "success": true }))
}

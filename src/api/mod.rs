// HTTP and WebSocket APIs of the mall hub

mod error;
mod mall;
mod parking;
mod upload;
pub mod websocket;

pub use error::AppError;
pub use upload::sanitize_file_name;
pub use websocket::ws_handler;

use crate::config::HubConfig;
use crate::hub::MallHub;
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<MallHub>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(hub: Arc<MallHub>, config: &HubConfig) -> Self {
        Self {
            hub,
            upload_dir: PathBuf::from(&config.upload_dir),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Create the hub router with every endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/api/get_state", get(get_state))
        .route("/api/toggle_parking", post(parking::toggle_parking))
        .route(
            "/api/upload_video",
            post(upload::upload_video).layer(upload_limit),
        )
        .route("/api/mall_update", post(mall::mall_update))
        .route("/api/ws", get(ws_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// GET /api/get_state - Full current state
async fn get_state(State(state): State<Arc<AppState>>) -> Json<crate::state::MallState> {
    Json(state.hub.snapshot())
}

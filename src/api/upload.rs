use super::{AppError, AppState};
use crate::state::MallAnalytics;
use axum::{
    extract::{multipart::Field, Multipart, State},
    response::Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Serialize)]
pub(super) struct UploadResponse {
    success: bool,
    file: String,
    result: Option<MallAnalytics>,
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`, dropping any
/// directory part and leading dots.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// POST /api/upload_video - Store a video for the analyzer
pub(super) async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            break;
        };
        let stored = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(&original));
        tokio::fs::create_dir_all(&state.upload_dir)
            .await
            .map_err(|e| {
                error!(error = %e, dir = %state.upload_dir.display(), "Failed to create upload directory");
                AppError::Internal("Failed to store upload".to_string())
            })?;

        let path = state.upload_dir.join(&stored);
        let bytes = match write_field(field, &path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!(error = %remove_err, file = %stored, "Failed to remove partial upload");
                    }
                }
                return Err(e);
            }
        };

        info!(file = %stored, bytes, "Video uploaded");
        return Ok(Json(UploadResponse {
            success: true,
            file: stored,
            result: state.hub.mall(),
        }));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

/// Stream one multipart field to `path`. Returns the number of bytes written.
async fn write_field(mut field: Field<'_>, path: &Path) -> Result<u64, AppError> {
    let store_err = |e: std::io::Error| {
        error!(error = %e, path = %path.display(), "Failed to write upload");
        AppError::Internal("Failed to store upload".to_string())
    };

    let mut file = tokio::fs::File::create(path).await.map_err(store_err)?;
    let mut written = 0u64;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        file.write_all(&chunk).await.map_err(store_err)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(store_err)?;
    Ok(written)
}

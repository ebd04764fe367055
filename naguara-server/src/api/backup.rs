//! Database backups (`/api/backup`), administrators only

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use shared::error::AppError;
use shared::models::{BackupCreado, BackupInfo, SessionUser};
use tokio_util::io::ReaderStream;

use crate::auth::require_admin;
use crate::services::backup::BackupService;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/backup/history", get(history))
        .route("/api/backup/create", post(create))
        .route("/api/backup/download/{filename}", get(download))
        .route("/api/backup/{filename}", delete(remove))
}

fn service(state: &AppState) -> BackupService {
    BackupService::from_config(&state.config)
}

pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> ApiResult<Vec<BackupInfo>> {
    require_admin(&user)?;
    Ok(Json(service(&state).list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<(StatusCode, Json<BackupCreado>), AppError> {
    require_admin(&user)?;
    let backup = service(&state).create().await?;
    tracing::info!(usuario_id = user.id, filename = %backup.filename, "Backup requested");
    Ok((
        StatusCode::CREATED,
        Json(BackupCreado {
            message: "Backup creado correctamente".to_string(),
            backup,
        }),
    ))
}

/// Stream the SQL file as an attachment
pub async fn download(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;
    let path = service(&state).path(&filename).await?;
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::error!(filename = %filename, error = %e, "Failed to open backup");
        AppError::internal("No se pudo leer el backup")
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/sql".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(filename): Path<String>,
) -> ApiResult<Value> {
    require_admin(&user)?;
    service(&state).delete(&filename).await?;
    Ok(Json(json!({ "message": "Backup eliminado correctamente" })))
}

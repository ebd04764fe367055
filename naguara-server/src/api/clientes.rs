//! Clients (`/api/clientes`)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use shared::error::{AppError, ErrorCode};
use shared::models::{Cliente, ClienteInput, ClienteQuery};

use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::extract::ValidatedJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/clientes", get(search).post(create))
        .route("/api/clientes/cedula/{cedula}", get(get_by_cedula))
        .route("/api/clientes/{id}", put(update))
}

fn duplicate() -> AppError {
    AppError::new(ErrorCode::ClientExists)
}

/// GET /api/clientes?nombre=|cedula=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<ClienteQuery>,
) -> ApiResult<Vec<Cliente>> {
    Ok(Json(db::clientes::search(&state.pool, &query.filtro()).await?))
}

pub async fn get_by_cedula(
    State(state): State<AppState>,
    Path(cedula): Path<String>,
) -> ApiResult<Cliente> {
    let cliente = db::clientes::find_by_cedula(&state.pool, cedula.trim())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    Ok(Json(cliente))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ClienteInput>,
) -> Result<(StatusCode, Json<Cliente>), AppError> {
    if db::clientes::cedula_exists(&state.pool, req.cedula_rif.trim(), None).await? {
        return Err(duplicate());
    }
    // The unique index still guards against a concurrent insert.
    let cliente = db::clientes::create(&state.pool, &req)
        .await
        .map_err(|e| e.on_duplicate(duplicate()))?;
    tracing::info!(cliente_id = cliente.id, "Client created");
    Ok((StatusCode::CREATED, Json(cliente)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<ClienteInput>,
) -> ApiResult<Cliente> {
    if db::clientes::cedula_exists(&state.pool, req.cedula_rif.trim(), Some(id)).await? {
        return Err(duplicate());
    }
    let cliente = db::clientes::update(&state.pool, id, &req)
        .await
        .map_err(|e| e.on_duplicate(duplicate()))?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    Ok(Json(cliente))
}

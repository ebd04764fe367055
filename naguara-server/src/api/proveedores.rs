//! Suppliers (`/api/proveedores`)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{Proveedor, ProveedorInput};

use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::extract::ValidatedJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/proveedores", get(list).post(create))
        .route("/api/proveedores/{id}", put(update).delete(delete))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Proveedor>> {
    Ok(Json(db::proveedores::list(&state.pool).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProveedorInput>,
) -> Result<(StatusCode, Json<Proveedor>), AppError> {
    let proveedor = db::proveedores::create(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(proveedor)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<ProveedorInput>,
) -> ApiResult<Proveedor> {
    let proveedor = db::proveedores::update(&state.pool, id, &req)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SupplierNotFound))?;
    Ok(Json(proveedor))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let deleted = db::proveedores::delete(&state.pool, id).await.map_err(|e| {
        e.on_reference(AppError::reference_conflict(
            "No se puede eliminar el proveedor porque tiene productos o compras asociadas",
        ))
    })?;
    if !deleted {
        return Err(AppError::new(ErrorCode::SupplierNotFound));
    }
    Ok(Json(json!({ "message": "Proveedor eliminado correctamente" })))
}

//! Categories (`/api/categorias`)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{Categoria, CategoriaInput};

use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::extract::ValidatedJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categorias", get(list).post(create))
        .route("/api/categorias/{id}", put(update).delete(delete))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Categoria>> {
    Ok(Json(db::categorias::list(&state.pool).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CategoriaInput>,
) -> Result<(StatusCode, Json<Categoria>), AppError> {
    let categoria = db::categorias::create(&state.pool, &req)
        .await
        .map_err(|e| e.on_duplicate(AppError::new(ErrorCode::CategoryNameExists)))?;
    Ok((StatusCode::CREATED, Json(categoria)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<CategoriaInput>,
) -> ApiResult<Categoria> {
    let categoria = db::categorias::update(&state.pool, id, &req)
        .await
        .map_err(|e| e.on_duplicate(AppError::new(ErrorCode::CategoryNameExists)))?
        .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
    Ok(Json(categoria))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let deleted = db::categorias::delete(&state.pool, id).await.map_err(|e| {
        e.on_reference(AppError::reference_conflict(
            "No se puede eliminar la categoría porque tiene productos asociados",
        ))
    })?;
    if !deleted {
        return Err(AppError::new(ErrorCode::CategoryNotFound));
    }
    Ok(Json(json!({ "message": "Categoría eliminada correctamente" })))
}

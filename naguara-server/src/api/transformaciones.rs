//! Product transformations (`/api/transformaciones`)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    SessionUser, Transformacion, TransformacionCreada, TransformacionCreate, TransformacionDetalle,
};

use crate::db;
use crate::state::AppState;
use crate::util::validate_positive;

use super::ApiResult;
use super::extract::AppJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transformaciones", get(list).post(create))
        .route("/api/transformaciones/{id}", get(detalles))
}

fn check_transformacion(req: &TransformacionCreate) -> Result<(), AppError> {
    if req.detalles.is_empty() {
        return Err(AppError::new(ErrorCode::TransformationEmpty));
    }
    validate_positive(req.cantidad_origen, "cantidad_origen")?;
    validate_positive(req.peso_real(), "peso_origen_real")?;
    for salida in &req.detalles {
        validate_positive(salida.cantidad_destino, "cantidad_destino")?;
    }
    Ok(())
}

/// POST /api/transformaciones - origin stock becomes output stock atomically
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    AppJson(req): AppJson<TransformacionCreate>,
) -> Result<(StatusCode, Json<TransformacionCreada>), AppError> {
    check_transformacion(&req)?;
    let id = db::transformaciones::create(&state.pool, user.id, &req)
        .await
        .map_err(|e| {
            e.on_reference(AppError::with_message(
                ErrorCode::ProductNotFound,
                "Producto de destino no encontrado",
            ))
        })?;

    tracing::info!(
        transformacion_id = id,
        origen = req.producto_origen_id,
        salidas = req.detalles.len(),
        "Transformation registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(TransformacionCreada {
            message: "Transformación registrada correctamente".to_string(),
            id,
        }),
    ))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Transformacion>> {
    Ok(Json(db::transformaciones::list(&state.pool).await?))
}

/// Outputs of one transformation
pub async fn detalles(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<TransformacionDetalle>> {
    Ok(Json(db::transformaciones::detalles(&state.pool, id).await?))
}

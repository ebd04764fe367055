//! Cash-register closure (`/api/cierre-caja`)

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use shared::error::{AppError, ErrorCode};
use shared::models::{CierreCajaCreate, CierreCajaResponse, FechaQuery, ResumenCaja, SessionUser};

use crate::db;
use crate::state::AppState;
use crate::util::validate_non_negative;

use super::ApiResult;
use super::extract::AppJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cierre-caja", post(create))
        .route("/api/cierre-caja/resumen", get(resumen))
}

fn check_montos(req: &CierreCajaCreate) -> Result<(), AppError> {
    validate_non_negative(req.efectivo_inicial, "efectivo_inicial")?;
    validate_non_negative(req.efectivo_final, "efectivo_final")?;
    validate_non_negative(req.total_ventas, "total_ventas")?;
    validate_non_negative(req.total_ventas_efectivo, "total_ventas_efectivo")?;
    validate_non_negative(req.total_ventas_tarjeta, "total_ventas_tarjeta")?;
    validate_non_negative(req.total_ventas_transferencia, "total_ventas_transferencia")?;
    validate_non_negative(req.total_ventas_pago_movil, "total_ventas_pago_movil")
}

/// POST /api/cierre-caja - one closure per user per day
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    AppJson(req): AppJson<CierreCajaCreate>,
) -> Result<(StatusCode, Json<CierreCajaResponse>), AppError> {
    check_montos(&req)?;
    let fecha = req.fecha.unwrap_or_else(|| Local::now().date_naive());

    let cierre = db::caja::create(&state.pool, user.id, fecha, &req)
        .await
        .map_err(|e| e.on_duplicate(AppError::new(ErrorCode::CashClosureExists)))?;

    tracing::info!(
        cierre_id = cierre.id,
        usuario_id = user.id,
        fecha = %fecha,
        diferencia = %cierre.diferencia,
        "Cash closure registered"
    );
    Ok((StatusCode::CREATED, Json(CierreCajaResponse { cierre })))
}

/// GET /api/cierre-caja/resumen?fecha= - current user's sales of the day
pub async fn resumen(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<FechaQuery>,
) -> ApiResult<ResumenCaja> {
    let fecha = query.fecha.unwrap_or_else(|| Local::now().date_naive());
    let por_metodo = db::caja::totales_por_metodo(&state.pool, user.id, fecha).await?;
    Ok(Json(ResumenCaja::new(fecha, por_metodo)))
}

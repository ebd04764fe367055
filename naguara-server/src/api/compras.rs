//! Supplier purchases (`/api/compras`)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use chrono::{Datelike, Local};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Compra, CompraConDetalles, CompraCreate, CompraQuery, DEFAULT_IVA_RATE, EstadisticasQuery,
    EstadisticasResponse, FacturaCompra, RecepcionResponse, RecibirCompra, SessionUser,
};

use crate::db;
use crate::state::AppState;
use crate::util::{validate_non_negative, validate_positive};

use super::ApiResult;
use super::extract::AppJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/compras", get(list).post(create))
        .route("/api/compras/stats/estadisticas", get(estadisticas))
        .route("/api/compras/{id}", get(get_by_id))
        .route("/api/compras/{id}/recibir", put(recibir))
        .route("/api/compras/{id}/factura", get(factura))
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::PurchaseNotFound)
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CompraQuery>,
) -> ApiResult<Vec<Compra>> {
    Ok(Json(db::compras::list(&state.pool, &query).await?))
}

fn check_compra(req: &CompraCreate) -> Result<(), AppError> {
    if req.detalles.is_empty() {
        return Err(AppError::validation("La compra debe tener al menos un producto"));
    }
    for linea in &req.detalles {
        validate_positive(linea.cantidad, "cantidad")?;
        validate_non_negative(linea.precio_compra, "precio_compra")?;
    }
    Ok(())
}

/// POST /api/compras - new purchase in `pendiente`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    AppJson(req): AppJson<CompraCreate>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    check_compra(&req)?;
    let id = db::compras::create(&state.pool, user.id, &req)
        .await
        .map_err(|e| {
            e.on_reference(AppError::validation("El proveedor o alguno de los productos no existe"))
        })?;
    let compra = db::compras::find(&state.pool, id).await?.ok_or_else(not_found)?;

    tracing::info!(compra_id = id, total = %compra.total, "Purchase created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Compra creada correctamente", "compra": compra })),
    ))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<CompraConDetalles> {
    let compra = db::compras::find(&state.pool, id).await?.ok_or_else(not_found)?;
    let detalles = db::compras::detalles(&state.pool, id).await?;
    Ok(Json(CompraConDetalles { compra, detalles }))
}

/// PUT /api/compras/{id}/recibir - stock grows by what arrived since the last reception
pub async fn recibir(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(req): AppJson<RecibirCompra>,
) -> ApiResult<RecepcionResponse> {
    if req.detalles_recibidos.is_empty() {
        return Err(AppError::required_fields().with_detail("campos", "detalles_recibidos"));
    }
    for linea in &req.detalles_recibidos {
        validate_non_negative(linea.cantidad_recibida, "cantidad_recibida")?;
    }

    let estado = db::compras::recibir(&state.pool, id, &req.detalles_recibidos).await?;
    tracing::info!(compra_id = id, estado = estado.as_str(), "Purchase received");
    Ok(Json(RecepcionResponse::new(estado)))
}

pub async fn factura(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<FacturaCompra> {
    let compra = db::compras::find(&state.pool, id).await?.ok_or_else(not_found)?;
    let detalles = db::compras::detalles(&state.pool, id).await?;
    let proveedor = db::compras::proveedor_factura(&state.pool, compra.id_proveedor).await?;
    let empresa = db::configuracion::empresa(&state.pool).await?;
    let iva_rate = db::configuracion::iva_general(&state.pool)
        .await?
        .unwrap_or(DEFAULT_IVA_RATE);
    Ok(Json(FacturaCompra::new(compra, proveedor, detalles, empresa, iva_rate)))
}

/// GET /api/compras/stats/estadisticas?mes=&año= (defaults to the current month)
pub async fn estadisticas(
    State(state): State<AppState>,
    Query(query): Query<EstadisticasQuery>,
) -> ApiResult<EstadisticasResponse> {
    let hoy = Local::now().date_naive();
    let mes = query.mes.filter(|m| (1..=12).contains(m)).unwrap_or(hoy.month());
    let anio = query.anio.unwrap_or(hoy.year());

    let estadisticas = db::compras::estadisticas(&state.pool, mes, anio).await?;
    let top_proveedores = db::compras::top_proveedores(&state.pool).await?;
    Ok(Json(EstadisticasResponse {
        estadisticas,
        top_proveedores,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::DetalleCompraInput;

    #[test]
    fn test_check_compra() {
        let mut req = CompraCreate {
            id_proveedor: 1,
            num_factura: None,
            observaciones: None,
            detalles: vec![DetalleCompraInput {
                id_producto: 1,
                cantidad: Decimal::from(10),
                precio_compra: Decimal::from(80),
            }],
        };
        assert!(check_compra(&req).is_ok());

        req.detalles[0].cantidad = Decimal::ZERO;
        assert!(check_compra(&req).is_err());

        req.detalles.clear();
        let err = check_compra(&req).unwrap_err();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }
}

//! Sales (`/api/ventas`)
//!
//! POST /api/ventas                 - process a sale (one transaction)
//! GET  /api/ventas?fecha=          - completed sales, newest first
//! GET  /api/ventas/top-productos   - best sellers of a day
//! GET  /api/ventas/{id}            - sale with client, seller, lines and VAT
//! GET  /api/ventas/{id}/factura    - printable HTML invoice

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Local;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DEFAULT_IVA_RATE, FacturaEmpresa, FechaQuery, MAX_CANTIDAD, MAX_PRECIO, SessionUser,
    TopProducto, VentaCreadaResponse, VentaCreate, VentaDetalle, VentaResumen,
};

use crate::db;
use crate::db::ventas::VentaExtras;
use crate::error::{PG_FOREIGN_KEY_VIOLATION, PG_UNIQUE_VIOLATION, ServiceError};
use crate::services::invoice::render_factura_venta;
use crate::state::AppState;
use crate::util::{non_empty, validate_non_negative, validate_positive};

use super::ApiResult;
use super::extract::AppJson;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ventas", get(list).post(create))
        .route("/api/ventas/top-productos", get(top_productos))
        .route("/api/ventas/{id}", get(get_by_id))
        .route("/api/ventas/{id}/factura", get(factura))
}

// ── POST /api/ventas ──

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    AppJson(req): AppJson<VentaCreate>,
) -> Result<(StatusCode, Json<VentaCreadaResponse>), AppError> {
    let total = check_lineas(&req)?;

    let metodo = db::configuracion::metodo_pago(&state.pool, req.metodo_pago.trim())
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::PaymentMethodNotFound).with_detail("metodo_pago", req.metodo_pago.clone())
        })?;
    if !metodo.habilitado {
        return Err(AppError::new(ErrorCode::PaymentMethodDisabled).with_detail("metodo_pago", metodo.id));
    }

    let extras = VentaExtras {
        total,
        cambio: calcular_cambio(&req, total)?,
        tasa_cambio: db::tasas::latest_rate(&state.pool).await?,
    };

    let venta = db::ventas::create(&state.pool, user.id, &req, &extras)
        .await
        .map_err(sale_error)?;

    tracing::info!(
        venta_id = venta.id,
        usuario_id = user.id,
        total = %venta.total,
        lineas = req.detalles.len(),
        "Sale processed"
    );
    Ok((
        StatusCode::CREATED,
        Json(VentaCreadaResponse {
            mensaje: "Venta procesada correctamente".to_string(),
            venta,
        }),
    ))
}

/// Shape checks that need no database; returns the sale total.
fn check_lineas(req: &VentaCreate) -> Result<Decimal, AppError> {
    if non_empty(Some(req.metodo_pago.as_str())).is_none() {
        return Err(AppError::required_fields().with_detail("campos", "metodo_pago"));
    }
    if req.detalles.is_empty() {
        return Err(AppError::new(ErrorCode::SaleEmpty));
    }
    for linea in &req.detalles {
        validate_positive(linea.cantidad, "cantidad")?;
        validate_non_negative(linea.precio_unitario, "precio_unitario")?;
        if linea.cantidad > MAX_CANTIDAD {
            return Err(AppError::validation("La cantidad excede el máximo permitido")
                .with_detail("id_producto", linea.id_producto));
        }
        if linea.precio_unitario > MAX_PRECIO {
            return Err(AppError::validation("El precio unitario excede el máximo permitido")
                .with_detail("id_producto", linea.id_producto));
        }
    }
    req.total()
        .ok_or_else(|| AppError::validation("El total de la venta excede el máximo permitido"))
}

/// Change owed on cash payments; `None` for every other method.
fn calcular_cambio(req: &VentaCreate, total: Decimal) -> Result<Option<Decimal>, AppError> {
    if !req.es_efectivo() {
        return Ok(None);
    }
    match req.monto_recibido {
        Some(monto) if monto >= total => Ok(Some(monto - total)),
        monto => Err(AppError::new(ErrorCode::PaymentInsufficientAmount)
            .with_detail("total", total.to_string())
            .with_detail("monto_recibido", monto.unwrap_or_default().to_string())),
    }
}

/// Every failure inside the sale transaction is reported as a 500.
fn sale_error(err: ServiceError) -> AppError {
    let motivo = err.to_string();
    match err.pg_code().as_deref() {
        Some(PG_UNIQUE_VIOLATION) => {
            return AppError::with_message(
                ErrorCode::SaleFailed,
                "Error de duplicado en la base de datos",
            )
            .with_detail("motivo", motivo);
        }
        Some(PG_FOREIGN_KEY_VIOLATION) => {
            return AppError::with_message(
                ErrorCode::SaleFailed,
                "Error de referencia (cliente o producto no existe)",
            )
            .with_detail("motivo", motivo);
        }
        _ => {}
    }
    match err {
        ServiceError::App(e) if e.code == ErrorCode::InsufficientStock => e,
        ServiceError::App(e) => AppError::new(ErrorCode::SaleFailed).with_detail("motivo", e.message),
        ServiceError::Db(e) => {
            tracing::error!(error = %e, "Sale transaction failed");
            AppError::new(ErrorCode::SaleFailed).with_detail("motivo", motivo)
        }
    }
}

// ── Queries ──

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<FechaQuery>,
) -> ApiResult<Vec<VentaResumen>> {
    Ok(Json(db::ventas::list(&state.pool, query.fecha).await?))
}

/// Top 10 products by quantity; the day defaults to today.
pub async fn top_productos(
    State(state): State<AppState>,
    Query(query): Query<FechaQuery>,
) -> ApiResult<Vec<TopProducto>> {
    let fecha = query.fecha.unwrap_or_else(|| Local::now().date_naive());
    Ok(Json(db::ventas::top_productos(&state.pool, fecha).await?))
}

async fn load_venta(state: &AppState, id: i32) -> Result<VentaDetalle, AppError> {
    let cabecera = db::ventas::find_cabecera(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SaleNotFound))?;
    let detalles = db::ventas::detalles(&state.pool, id).await?;
    let iva_rate = db::configuracion::iva_general(&state.pool)
        .await?
        .unwrap_or(DEFAULT_IVA_RATE);
    Ok(VentaDetalle::new(cabecera, detalles, iva_rate))
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<VentaDetalle> {
    Ok(Json(load_venta(&state, id).await?))
}

pub async fn factura(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let venta = load_venta(&state, id).await?;
    let empresa = FacturaEmpresa::from(db::configuracion::empresa(&state.pool).await?);
    Ok(Html(render_factura_venta(&empresa, &venta)))
}

//! Business configuration and dashboard
//!
//! GET      /api/dashboard/stats                    - public counters
//! GET/PUT  /api/empresa                            - company singleton
//! GET/PUT  /api/configuracion/negocio              - general VAT rate
//! GET      /api/configuracion/metodos-pago         - payment methods
//! PUT      /api/configuracion/metodos-pago/{metodo}
//! GET      /api/tasas-iva                          - active VAT rates

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    ConfigNegocio, DEFAULT_IVA_RATE, DashboardStats, Empresa, EmpresaInput, MetodoPago,
    MetodoPagoUpdate, TasaIva,
};

use crate::db;
use crate::state::AppState;

use super::ApiResult;
use super::extract::{AppJson, ValidatedJson};

/// Routes outside the auth gate
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(dashboard_stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/empresa", get(get_empresa).put(update_empresa))
        .route(
            "/api/configuracion/negocio",
            get(get_negocio).put(update_negocio),
        )
        .route("/api/configuracion/metodos-pago", get(metodos_pago))
        .route(
            "/api/configuracion/metodos-pago/{metodo}",
            put(update_metodo_pago),
        )
        .route("/api/tasas-iva", get(tasas_iva))
}

pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    Ok(Json(db::configuracion::dashboard_stats(&state.pool).await?))
}

// ── Empresa ──

/// Stored company data, or the built-in defaults before the first save
pub async fn get_empresa(State(state): State<AppState>) -> ApiResult<Empresa> {
    let empresa = db::configuracion::empresa(&state.pool).await?;
    Ok(Json(empresa.unwrap_or_default()))
}

pub async fn update_empresa(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<EmpresaInput>,
) -> ApiResult<Empresa> {
    let empresa = db::configuracion::upsert_empresa(&state.pool, &req).await?;
    tracing::info!(nombre = ?empresa.nombre_empresa, "Company data updated");
    Ok(Json(empresa))
}

// ── VAT ──

pub async fn get_negocio(State(state): State<AppState>) -> ApiResult<ConfigNegocio> {
    let iva_rate = db::configuracion::iva_general(&state.pool)
        .await?
        .unwrap_or(DEFAULT_IVA_RATE);
    Ok(Json(ConfigNegocio { iva_rate }))
}

fn check_iva_rate(rate: Decimal) -> Result<(), AppError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(AppError::validation("La tasa de IVA debe estar entre 0 y 100")
            .with_detail("iva_rate", rate.to_string()));
    }
    Ok(())
}

pub async fn update_negocio(
    State(state): State<AppState>,
    AppJson(req): AppJson<ConfigNegocio>,
) -> ApiResult<Value> {
    check_iva_rate(req.iva_rate)?;
    db::configuracion::set_iva_general(&state.pool, req.iva_rate).await?;
    tracing::info!(iva_rate = %req.iva_rate, "General VAT rate updated");
    Ok(Json(json!({
        "message": "IVA actualizado correctamente",
        "configuracion": req,
    })))
}

pub async fn tasas_iva(State(state): State<AppState>) -> ApiResult<Vec<TasaIva>> {
    Ok(Json(db::configuracion::tasas_iva(&state.pool).await?))
}

// ── Payment methods ──

pub async fn metodos_pago(State(state): State<AppState>) -> ApiResult<Vec<MetodoPago>> {
    Ok(Json(db::configuracion::metodos_pago(&state.pool).await?))
}

pub async fn update_metodo_pago(
    State(state): State<AppState>,
    Path(metodo): Path<String>,
    AppJson(req): AppJson<MetodoPagoUpdate>,
) -> ApiResult<Value> {
    let metodo = db::configuracion::set_metodo_habilitado(&state.pool, &metodo, req.habilitado)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentMethodNotFound))?;
    tracing::info!(metodo = %metodo.id, habilitado = metodo.habilitado, "Payment method updated");
    Ok(Json(json!({ "message": "Estado actualizado", "metodo": metodo })))
}

//! Exchange rate (`/api/tasa-cambio`)

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use shared::models::{TasaActual, TasaCambio};

use crate::db;
use crate::services::exchange_rate::refresh_rate;
use crate::state::AppState;

use super::ApiResult;

/// Routes outside the auth gate
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/tasa-cambio/actual", get(actual))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tasa-cambio/historial", get(historial))
}

/// Official rate, falling back to the stored rate and then the default
pub async fn actual(State(state): State<AppState>) -> ApiResult<TasaActual> {
    Ok(Json(refresh_rate(&state).await))
}

/// Last 30 stored rates
pub async fn historial(State(state): State<AppState>) -> ApiResult<Vec<TasaCambio>> {
    Ok(Json(db::tasas::historial(&state.pool).await?))
}

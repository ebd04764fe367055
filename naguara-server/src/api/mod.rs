//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - register, login, logout, session
//! - [`usuarios`] - user administration
//! - [`productos`], [`categorias`], [`proveedores`], [`clientes`] - catalog
//! - [`ventas`] - sales and invoices
//! - [`caja`] - cash-register closure
//! - [`compras`] - supplier purchases
//! - [`transformaciones`] - product transformations
//! - [`tasas`] - exchange rate
//! - [`configuracion`] - company, VAT, payment methods, dashboard
//! - [`backup`] - database backups
//!
//! Everything under `/api` sits behind the session gate except
//! `/api/sesion`, `/api/tasa-cambio/actual` and `/api/dashboard/stats`.

pub mod extract;
pub mod middleware;

pub mod auth;
pub mod health;
pub mod usuarios;

pub mod backup;
pub mod caja;
pub mod categorias;
pub mod clientes;
pub mod compras;
pub mod configuracion;
pub mod productos;
pub mod proveedores;
pub mod tasas;
pub mod transformaciones;
pub mod ventas;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Json, Router, middleware as axum_middleware};
use shared::error::AppError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Handler result with a JSON body
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Routes reachable without a session
pub fn public_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(tasas::public_router())
        .merge(configuracion::public_router())
}

/// Routes behind the session gate
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .merge(auth::protected_router())
        .merge(usuarios::router())
        .merge(productos::router())
        .merge(categorias::router())
        .merge(proveedores::router())
        .merge(clientes::router())
        .merge(ventas::router())
        .merge(caja::router())
        .merge(compras::router())
        .merge(transformaciones::router())
        .merge(tasas::router())
        .merge(configuracion::router())
        .merge(backup::router())
}

/// Fully configured application: routes, session gate, middleware and state
pub fn build_app(state: AppState) -> Router {
    let protected = protected_router().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        crate::auth::require_auth,
    ));
    let request_id = HeaderName::from_static(middleware::REQUEST_ID_HEADER);

    public_router()
        .merge(protected)
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

/// Credentialed CORS for the configured frontend origins
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

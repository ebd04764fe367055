//! Product catalog (`/api/productos`)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Pagination, Producto, ProductoCreate, ProductoListado, ProductoPage, ProductoQuery,
    ProductoUpdate, SessionUser, StockDecrement, page_window,
};

use crate::db;
use crate::services::exchange_rate::current_stored_rate;
use crate::state::AppState;
use crate::util::{validate_non_negative, validate_positive};

use super::ApiResult;
use super::extract::{AppJson, ValidatedJson};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/productos", get(list).post(create))
        // Static segment before /{id}
        .route("/api/productos/stock-bajo", get(stock_bajo))
        .route(
            "/api/productos/{id}",
            get(get_by_id).put(update).delete(delete),
        )
        .route("/api/productos/{id}/stock", put(decrement_stock))
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::ProductNotFound)
}

fn invalid_reference() -> AppError {
    AppError::validation("La categoría, el proveedor o la tasa de IVA no existe")
}

fn check_amounts(
    precio_venta: rust_decimal::Decimal,
    stock: rust_decimal::Decimal,
) -> Result<(), AppError> {
    validate_non_negative(precio_venta, "precio_venta")?;
    validate_non_negative(stock, "stock")
}

/// GET /api/productos - filtered, paginated, priced in USD
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductoQuery>,
) -> ApiResult<ProductoPage> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let (rows, total) = db::productos::list(&state.pool, &query, limit, offset).await?;
    let tasa = current_stored_rate(&state).await?;

    Ok(Json(ProductoPage {
        productos: rows
            .into_iter()
            .map(|p| ProductoListado::new(p, tasa))
            .collect(),
        pagination: Pagination::new(page, limit, total),
    }))
}

pub async fn stock_bajo(State(state): State<AppState>) -> ApiResult<Vec<Producto>> {
    Ok(Json(db::productos::stock_bajo(&state.pool).await?))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ProductoListado> {
    let producto = db::productos::find(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    let tasa = current_stored_rate(&state).await?;
    Ok(Json(ProductoListado::new(producto, tasa)))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProductoCreate>,
) -> Result<(StatusCode, Json<Producto>), AppError> {
    check_amounts(req.precio_venta, req.stock)?;
    let producto = db::productos::create(&state.pool, &req)
        .await
        .map_err(|e| e.on_reference(invalid_reference()))?;
    tracing::info!(producto_id = producto.id, nombre = %producto.nombre, "Product created");
    Ok((StatusCode::CREATED, Json(producto)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<ProductoUpdate>,
) -> ApiResult<Producto> {
    check_amounts(req.precio_venta, req.stock)?;
    let producto = db::productos::update(&state.pool, id, &req, user.id)
        .await
        .map_err(|e| e.on_reference(invalid_reference()))?
        .ok_or_else(not_found)?;
    Ok(Json(producto))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Value> {
    let deleted = db::productos::delete(&state.pool, id).await.map_err(|e| {
        e.on_reference(AppError::reference_conflict(
            "No se puede eliminar el producto porque tiene ventas o compras asociadas",
        ))
    })?;
    if !deleted {
        return Err(not_found());
    }
    tracing::info!(producto_id = id, "Product deleted");
    Ok(Json(json!({ "message": "Producto eliminado correctamente" })))
}

/// PUT /api/productos/{id}/stock - subtract `cantidad`, never below zero
pub async fn decrement_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(req): AppJson<StockDecrement>,
) -> ApiResult<Producto> {
    validate_positive(req.cantidad, "cantidad")?;
    let producto = db::productos::decrement_stock(&state.pool, id, req.cantidad)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(producto))
}

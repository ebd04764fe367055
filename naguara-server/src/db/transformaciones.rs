//! Transformacion database operations

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Transformacion, TransformacionCreate, TransformacionDetalle};
use sqlx::PgPool;

use crate::error::ServiceResult;

/// Convert origin stock into output stock in one transaction; returns the new id.
///
/// The origin and every destination are locked together in ascending id
/// order, the same order a sale locks its products in.
pub async fn create(
    pool: &PgPool,
    usuario_id: i32,
    data: &TransformacionCreate,
) -> ServiceResult<i32> {
    let mut tx = pool.begin().await?;

    let mut ids: Vec<i32> = data
        .detalles
        .iter()
        .map(|d| d.producto_destino_id)
        .chain(std::iter::once(data.producto_origen_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let locked: Vec<(i32, String, Decimal)> = sqlx::query_as(
        "SELECT id, nombre, stock FROM productos WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;
    let productos: HashMap<i32, (String, Decimal)> = locked
        .into_iter()
        .map(|(id, nombre, stock)| (id, (nombre, stock)))
        .collect();

    let (nombre, stock) = productos.get(&data.producto_origen_id).ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, "Producto de origen no encontrado")
    })?;
    if let Some(salida) = data
        .detalles
        .iter()
        .find(|d| !productos.contains_key(&d.producto_destino_id))
    {
        return Err(AppError::with_message(
            ErrorCode::ProductNotFound,
            "Producto de destino no encontrado",
        )
        .with_detail("producto_destino_id", salida.producto_destino_id)
        .into());
    }

    if *stock < data.cantidad_origen {
        return Err(AppError::insufficient_stock(format!(
            "Stock insuficiente de {nombre}. Disponible: {stock}"
        ))
        .into());
    }

    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO transformacion_producto
            (usuario_id, producto_origen_id, cantidad_origen, peso_origen_real, observaciones)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(usuario_id)
    .bind(data.producto_origen_id)
    .bind(data.cantidad_origen)
    .bind(data.peso_real())
    .bind(&data.observaciones)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE productos SET stock = stock - $1 WHERE id = $2")
        .bind(data.cantidad_origen)
        .bind(data.producto_origen_id)
        .execute(&mut *tx)
        .await?;

    for salida in &data.detalles {
        sqlx::query(
            r#"
            INSERT INTO transformacion_detalles (transformacion_id, producto_destino_id, cantidad_destino)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(salida.producto_destino_id)
        .bind(salida.cantidad_destino)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE productos SET stock = stock + $1 WHERE id = $2")
            .bind(salida.cantidad_destino)
            .bind(salida.producto_destino_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// History, newest first
pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Transformacion>> {
    let rows = sqlx::query_as::<_, Transformacion>(
        r#"
        SELECT t.id, t.fecha_transformacion, t.cantidad_origen, t.peso_origen_real,
               t.observaciones, p.nombre AS nombre_origen, u.nombre AS usuario
        FROM transformacion_producto t
        JOIN productos p ON t.producto_origen_id = p.id
        JOIN usuarios u ON t.usuario_id = u.id
        ORDER BY t.fecha_transformacion DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn detalles(pool: &PgPool, id: i32) -> ServiceResult<Vec<TransformacionDetalle>> {
    let rows = sqlx::query_as::<_, TransformacionDetalle>(
        r#"
        SELECT td.producto_destino_id, td.cantidad_destino, p.nombre AS nombre_producto
        FROM transformacion_detalles td
        JOIN productos p ON td.producto_destino_id = p.id
        WHERE td.transformacion_id = $1
        ORDER BY td.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

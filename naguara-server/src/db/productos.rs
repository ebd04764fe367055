//! Producto database operations

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Producto, ProductoCreate, ProductoQuery, ProductoUpdate};
use sqlx::PgPool;

use crate::error::ServiceResult;
use crate::util::non_empty;

use super::like_pattern;

const PRODUCTO_SELECT: &str = r#"
    SELECT p.id, p.nombre, p.precio_venta, p.precio_dolares, p.costo_compra,
           p.stock, p.stock_minimo, p.unidad_medida, p.categoria_id, p.id_provedores,
           p.id_tasa_iva, p.estado,
           COALESCE(c.nombre, 'Sin categoría') AS categoria,
           prov.nombre AS proveedor,
           ti.tasa AS tasa_iva
    FROM productos p
    LEFT JOIN categorias c ON p.categoria_id = c.id
    LEFT JOIN proveedores prov ON p.id_provedores = prov.id
    LEFT JOIN tasas_iva ti ON p.id_tasa_iva = ti.id
"#;

const PRODUCTO_FILTER: &str = r#"
    WHERE ($1::INT IS NULL OR p.categoria_id = $1)
      AND ($2::TEXT IS NULL OR p.nombre ILIKE $2)
      AND (NOT $3 OR p.stock <= p.stock_minimo)
      AND ($4 OR p.stock > 0)
"#;

/// One page of the filtered listing plus the total match count
pub async fn list(
    pool: &PgPool,
    query: &ProductoQuery,
    limit: i64,
    offset: i64,
) -> ServiceResult<(Vec<Producto>, i64)> {
    let search = non_empty(query.search.as_deref()).map(like_pattern);

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM productos p {PRODUCTO_FILTER}"
    ))
    .bind(query.categoria_id)
    .bind(&search)
    .bind(query.stock_alerts)
    .bind(query.include_zero_stock)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, Producto>(&format!(
        "{PRODUCTO_SELECT} {PRODUCTO_FILTER} ORDER BY p.nombre LIMIT $5 OFFSET $6"
    ))
    .bind(query.categoria_id)
    .bind(&search)
    .bind(query.stock_alerts)
    .bind(query.include_zero_stock)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find(pool: &PgPool, id: i32) -> ServiceResult<Option<Producto>> {
    let row = sqlx::query_as::<_, Producto>(&format!("{PRODUCTO_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active products at or below their minimum stock
pub async fn stock_bajo(pool: &PgPool) -> ServiceResult<Vec<Producto>> {
    let rows = sqlx::query_as::<_, Producto>(&format!(
        "{PRODUCTO_SELECT} WHERE p.stock <= p.stock_minimo AND p.estado = 'Activo' ORDER BY p.stock ASC, p.nombre"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, data: &ProductoCreate) -> ServiceResult<Producto> {
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO productos (
            nombre, precio_venta, precio_dolares, costo_compra, stock, stock_minimo,
            unidad_medida, categoria_id, id_provedores, id_tasa_iva
        )
        VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(data.nombre.trim())
    .bind(data.precio_venta)
    .bind(data.precio_dolares)
    .bind(data.costo_compra)
    .bind(data.stock)
    .bind(data.stock_minimo)
    .bind(data.unidad_medida.trim())
    .bind(data.categoria_id)
    .bind(data.id_provedores)
    .bind(data.id_tasa_iva)
    .fetch_one(pool)
    .await?;

    find(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).into())
}

/// Update a product. A stock change requires `motivo_ajuste` and is
/// recorded in `ajustes_inventario` in the same transaction.
pub async fn update(
    pool: &PgPool,
    id: i32,
    data: &ProductoUpdate,
    usuario_id: i32,
) -> ServiceResult<Option<Producto>> {
    let mut tx = pool.begin().await?;

    let stock_anterior: Option<Decimal> =
        sqlx::query_scalar("SELECT stock FROM productos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(stock_anterior) = stock_anterior else {
        return Ok(None);
    };

    if stock_anterior != data.stock {
        let motivo = non_empty(data.motivo_ajuste.as_deref())
            .ok_or_else(|| AppError::new(ErrorCode::AdjustmentReasonRequired))?;
        sqlx::query(
            r#"
            INSERT INTO ajustes_inventario (producto_id, usuario_id, stock_anterior, stock_nuevo, motivo)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(usuario_id)
        .bind(stock_anterior)
        .bind(data.stock)
        .bind(motivo)
        .execute(&mut *tx)
        .await?;
        tracing::info!(
            producto_id = id,
            usuario_id,
            %stock_anterior,
            stock_nuevo = %data.stock,
            "Inventory adjusted"
        );
    }

    sqlx::query(
        r#"
        UPDATE productos SET
            nombre = $1, precio_venta = $2, precio_dolares = $3, costo_compra = $4,
            stock = $5, stock_minimo = COALESCE($6, stock_minimo), unidad_medida = $7,
            categoria_id = $8, id_provedores = $9, id_tasa_iva = $10,
            estado = COALESCE($11, estado)
        WHERE id = $12
        "#,
    )
    .bind(data.nombre.trim())
    .bind(data.precio_venta)
    .bind(data.precio_dolares)
    .bind(data.costo_compra)
    .bind(data.stock)
    .bind(data.stock_minimo)
    .bind(data.unidad_medida.trim())
    .bind(data.categoria_id)
    .bind(data.id_provedores)
    .bind(data.id_tasa_iva)
    .bind(&data.estado)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    find(pool, id).await
}

/// Returns false when the product does not exist.
pub async fn delete(pool: &PgPool, id: i32) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM productos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Subtract `cantidad` from the stock, refusing to go negative.
pub async fn decrement_stock(
    pool: &PgPool,
    id: i32,
    cantidad: Decimal,
) -> ServiceResult<Option<Producto>> {
    let mut tx = pool.begin().await?;

    let row: Option<(String, Decimal)> =
        sqlx::query_as("SELECT nombre, stock FROM productos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((nombre, stock)) = row else {
        return Ok(None);
    };

    if stock < cantidad {
        return Err(AppError::validation(format!(
            "Stock insuficiente para \"{nombre}\". Disponible: {stock}, Solicitado: {cantidad}"
        ))
        .into());
    }

    sqlx::query("UPDATE productos SET stock = stock - $1 WHERE id = $2")
        .bind(cantidad)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    find(pool, id).await
}

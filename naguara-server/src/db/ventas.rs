//! Venta database operations

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DetalleVenta, ESTADO_COMPLETADA, TopProducto, VentaCabecera, VentaCreada, VentaCreate,
    VentaResumen,
};
use sqlx::PgPool;

use crate::error::ServiceResult;

/// Values computed before the transaction starts
#[derive(Debug, Clone, Default)]
pub struct VentaExtras {
    /// Σ cantidad × precio_unitario, checked before the transaction
    pub total: Decimal,
    pub cambio: Option<Decimal>,
    pub tasa_cambio: Option<Decimal>,
}

/// Insert a sale with its lines and decrement stock, atomically.
///
/// Every product of the sale is locked (`FOR UPDATE`, ascending id) before
/// any stock is checked, so concurrent sales of the same product serialize
/// and stock never goes negative. Repeated products are checked against the
/// stock left by earlier lines of the same sale.
pub async fn create(
    pool: &PgPool,
    usuario_id: i32,
    data: &VentaCreate,
    extras: &VentaExtras,
) -> ServiceResult<VentaCreada> {
    let mut tx = pool.begin().await?;

    let (id, fecha_venta): (i32, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO ventas (
            id_usuario, id_cliente, metodo_pago, estado, detalles_pago,
            referencia_pago, banco_pago, monto_recibido, cambio, tasa_cambio
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, fecha_venta
        "#,
    )
    .bind(usuario_id)
    .bind(data.id_cliente)
    .bind(&data.metodo_pago)
    .bind(ESTADO_COMPLETADA)
    .bind(&data.detalles_pago)
    .bind(&data.referencia_pago)
    .bind(&data.banco_pago)
    .bind(data.monto_recibido)
    .bind(extras.cambio)
    .bind(extras.tasa_cambio)
    .fetch_one(&mut *tx)
    .await?;

    let mut ids: Vec<i32> = data.detalles.iter().map(|d| d.id_producto).collect();
    ids.sort_unstable();
    ids.dedup();

    let locked: Vec<(i32, String, Decimal)> = sqlx::query_as(
        "SELECT id, nombre, stock FROM productos WHERE id = ANY($1) ORDER BY id FOR UPDATE",
    )
    .bind(&ids)
    .fetch_all(&mut *tx)
    .await?;
    let mut disponible: HashMap<i32, (String, Decimal)> = locked
        .into_iter()
        .map(|(id, nombre, stock)| (id, (nombre, stock)))
        .collect();

    for detalle in &data.detalles {
        let (nombre, stock) = disponible.get_mut(&detalle.id_producto).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Producto con ID {} no encontrado", detalle.id_producto),
            )
        })?;

        if *stock < detalle.cantidad {
            return Err(AppError::insufficient_stock(format!(
                "Stock insuficiente para \"{nombre}\". Disponible: {stock}, Solicitado: {}",
                detalle.cantidad
            ))
            .into());
        }
        *stock -= detalle.cantidad;

        sqlx::query(
            r#"
            INSERT INTO detalle_venta (id_venta, id_producto, cantidad, precio_unitario)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(detalle.id_producto)
        .bind(detalle.cantidad)
        .bind(detalle.precio_unitario)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE productos SET stock = stock - $1 WHERE id = $2")
            .bind(detalle.cantidad)
            .bind(detalle.id_producto)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(VentaCreada {
        id,
        fecha_venta,
        total: extras.total,
    })
}

/// Completed sales, newest first, optionally for one day
pub async fn list(pool: &PgPool, fecha: Option<NaiveDate>) -> ServiceResult<Vec<VentaResumen>> {
    let rows = sqlx::query_as::<_, VentaResumen>(
        r#"
        SELECT v.id, v.id_usuario, v.id_cliente, v.metodo_pago, v.estado, v.fecha_venta,
               v.referencia_pago, v.banco_pago, v.monto_recibido, v.cambio, v.tasa_cambio,
               c.nombre AS cliente_nombre,
               COALESCE((SELECT SUM(dv.cantidad * dv.precio_unitario)
                         FROM detalle_venta dv WHERE dv.id_venta = v.id), 0) AS total
        FROM ventas v
        LEFT JOIN clientes c ON v.id_cliente = c.id
        WHERE v.estado = $1
          AND ($2::DATE IS NULL OR DATE(v.fecha_venta) = $2)
        ORDER BY v.fecha_venta DESC
        "#,
    )
    .bind(ESTADO_COMPLETADA)
    .bind(fecha)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_cabecera(pool: &PgPool, id: i32) -> ServiceResult<Option<VentaCabecera>> {
    let row = sqlx::query_as::<_, VentaCabecera>(
        r#"
        SELECT v.id, v.fecha_venta, v.metodo_pago, v.estado, v.referencia_pago, v.banco_pago,
               v.monto_recibido, v.cambio, v.tasa_cambio,
               c.nombre AS cliente_nombre, c.cedula_rif, c.telefono, c.direccion,
               u.nombre AS vendedor_nombre
        FROM ventas v
        LEFT JOIN clientes c ON v.id_cliente = c.id
        LEFT JOIN usuarios u ON v.id_usuario = u.id
        WHERE v.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn detalles(pool: &PgPool, id_venta: i32) -> ServiceResult<Vec<DetalleVenta>> {
    let rows = sqlx::query_as::<_, DetalleVenta>(
        r#"
        SELECT dv.id, dv.id_venta, dv.id_producto, dv.cantidad, dv.precio_unitario,
               p.nombre AS producto_nombre, p.unidad_medida
        FROM detalle_venta dv
        LEFT JOIN productos p ON dv.id_producto = p.id
        WHERE dv.id_venta = $1
        ORDER BY dv.id
        "#,
    )
    .bind(id_venta)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Top 10 products of a day by quantity sold
pub async fn top_productos(pool: &PgPool, fecha: NaiveDate) -> ServiceResult<Vec<TopProducto>> {
    let rows = sqlx::query_as::<_, TopProducto>(
        r#"
        SELECT p.nombre,
               SUM(dv.cantidad) AS cantidad,
               SUM(dv.cantidad * dv.precio_unitario) AS total
        FROM detalle_venta dv
        JOIN productos p ON dv.id_producto = p.id
        JOIN ventas v ON dv.id_venta = v.id
        WHERE DATE(v.fecha_venta) = $1 AND v.estado = $2
        GROUP BY p.id, p.nombre
        ORDER BY cantidad DESC
        LIMIT 10
        "#,
    )
    .bind(fecha)
    .bind(ESTADO_COMPLETADA)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

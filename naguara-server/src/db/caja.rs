//! Cash-register closure database operations

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{CierreCaja, CierreCajaCreate, ESTADO_CIERRE_COMPLETADO, ESTADO_COMPLETADA, TotalMetodo};
use sqlx::PgPool;

use crate::error::ServiceResult;

/// Insert the closure of `fecha` for a user; one per user per day.
pub async fn create(
    pool: &PgPool,
    usuario_id: i32,
    fecha: NaiveDate,
    data: &CierreCajaCreate,
) -> ServiceResult<CierreCaja> {
    let mut tx = pool.begin().await?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM cierre_caja WHERE fecha = $1 AND usuario_id = $2")
            .bind(fecha)
            .bind(usuario_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(AppError::with_message(
            ErrorCode::CashClosureExists,
            "Ya existe un cierre de caja para esta fecha y usuario",
        )
        .into());
    }

    let row = sqlx::query_as::<_, CierreCaja>(
        r#"
        INSERT INTO cierre_caja (
            fecha, usuario_id, efectivo_inicial, efectivo_final, total_ventas,
            total_ventas_efectivo, total_ventas_tarjeta, total_ventas_transferencia,
            total_ventas_pago_movil, diferencia, estado
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, fecha, usuario_id, efectivo_inicial, efectivo_final, total_ventas,
                  total_ventas_efectivo, total_ventas_tarjeta, total_ventas_transferencia,
                  total_ventas_pago_movil, diferencia, estado, fecha_creacion
        "#,
    )
    .bind(fecha)
    .bind(usuario_id)
    .bind(data.efectivo_inicial)
    .bind(data.efectivo_final)
    .bind(data.total_ventas)
    .bind(data.total_ventas_efectivo)
    .bind(data.total_ventas_tarjeta)
    .bind(data.total_ventas_transferencia)
    .bind(data.total_ventas_pago_movil)
    .bind(data.diferencia_calculada())
    .bind(ESTADO_CIERRE_COMPLETADO)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Completed sales of a user on one day, totalled per payment method
pub async fn totales_por_metodo(
    pool: &PgPool,
    usuario_id: i32,
    fecha: NaiveDate,
) -> ServiceResult<Vec<TotalMetodo>> {
    let rows = sqlx::query_as::<_, TotalMetodo>(
        r#"
        SELECT v.metodo_pago,
               COUNT(DISTINCT v.id) AS cantidad_ventas,
               COALESCE(SUM(dv.cantidad * dv.precio_unitario), 0) AS total
        FROM ventas v
        LEFT JOIN detalle_venta dv ON dv.id_venta = v.id
        WHERE v.id_usuario = $1 AND DATE(v.fecha_venta) = $2 AND v.estado = $3
        GROUP BY v.metodo_pago
        ORDER BY v.metodo_pago
        "#,
    )
    .bind(usuario_id)
    .bind(fecha)
    .bind(ESTADO_COMPLETADA)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

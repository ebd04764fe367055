//! Exchange-rate history (`tasa_cambio`)

use rust_decimal::Decimal;
use shared::models::TasaCambio;
use sqlx::PgPool;

use crate::error::ServiceResult;

pub const HISTORIAL_LIMIT: i64 = 30;

/// Most recent stored rate, active or not
pub async fn latest_rate(pool: &PgPool) -> ServiceResult<Option<Decimal>> {
    let tasa = sqlx::query_scalar(
        "SELECT tasa_bs FROM tasa_cambio ORDER BY fecha_actualizacion DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(tasa)
}

/// Most recent active stored rate
pub async fn latest_active_rate(pool: &PgPool) -> ServiceResult<Option<Decimal>> {
    let tasa = sqlx::query_scalar(
        "SELECT tasa_bs FROM tasa_cambio WHERE activo = TRUE \
         ORDER BY fecha_actualizacion DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(tasa)
}

pub async fn insert_rate(pool: &PgPool, tasa_bs: Decimal, fuente: &str) -> ServiceResult<()> {
    sqlx::query("INSERT INTO tasa_cambio (tasa_bs, fuente) VALUES ($1, $2)")
        .bind(tasa_bs)
        .bind(fuente)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn historial(pool: &PgPool) -> ServiceResult<Vec<TasaCambio>> {
    let rows = sqlx::query_as::<_, TasaCambio>(
        "SELECT id, tasa_bs, fuente, activo, fecha_actualizacion FROM tasa_cambio \
         ORDER BY fecha_actualizacion DESC, id DESC LIMIT $1",
    )
    .bind(HISTORIAL_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

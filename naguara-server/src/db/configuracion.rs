//! Business configuration: company data, VAT, payment methods, dashboard

use rust_decimal::Decimal;
use shared::models::{
    DashboardStats, Empresa, EmpresaInput, METODOS_PAGO_DEFAULT, MetodoPago, TasaIva,
};
use sqlx::PgPool;

use crate::error::ServiceResult;

const EMPRESA_COLUMNS: &str =
    "id, nombre_empresa, rif, telefono, direccion, email, mensaje_factura";

// ── Empresa ──

pub async fn empresa(pool: &PgPool) -> ServiceResult<Option<Empresa>> {
    let row = sqlx::query_as::<_, Empresa>(&format!(
        "SELECT {EMPRESA_COLUMNS} FROM configuracion_empresa ORDER BY id ASC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Update the company singleton, creating it on first use.
pub async fn upsert_empresa(pool: &PgPool, data: &EmpresaInput) -> ServiceResult<Empresa> {
    let mut tx = pool.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar(
        "SELECT id FROM configuracion_empresa ORDER BY id ASC LIMIT 1 FOR UPDATE",
    )
    .fetch_optional(&mut *tx)
    .await?;

    let row = match existing {
        Some(id) => {
            sqlx::query_as::<_, Empresa>(&format!(
                "UPDATE configuracion_empresa SET nombre_empresa = $1, rif = $2, telefono = $3, \
                 direccion = $4, email = $5, mensaje_factura = $6 WHERE id = $7 \
                 RETURNING {EMPRESA_COLUMNS}"
            ))
            .bind(data.nombre_empresa.trim())
            .bind(&data.rif)
            .bind(&data.telefono)
            .bind(&data.direccion)
            .bind(&data.email)
            .bind(&data.mensaje_factura)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
        }
        None => {
            sqlx::query_as::<_, Empresa>(&format!(
                "INSERT INTO configuracion_empresa \
                 (nombre_empresa, rif, telefono, direccion, email, mensaje_factura) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING {EMPRESA_COLUMNS}"
            ))
            .bind(data.nombre_empresa.trim())
            .bind(&data.rif)
            .bind(&data.telefono)
            .bind(&data.direccion)
            .bind(&data.email)
            .bind(&data.mensaje_factura)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    tx.commit().await?;
    Ok(row)
}

// ── VAT ──

/// General VAT rate (percent), if configured
pub async fn iva_general(pool: &PgPool) -> ServiceResult<Option<Decimal>> {
    let tasa = sqlx::query_scalar(
        "SELECT tasa FROM tasas_iva WHERE tipo = 'general' ORDER BY id ASC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(tasa)
}

/// Set the general VAT rate, inserting the row when missing.
pub async fn set_iva_general(pool: &PgPool, tasa: Decimal) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE tasas_iva SET tasa = $1, fecha_actualizacion = NOW() WHERE tipo = 'general'",
    )
    .bind(tasa)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            "INSERT INTO tasas_iva (tasa, descripcion, tipo, estado) \
             VALUES ($1, 'IVA General', 'general', 'Activa')",
        )
        .bind(tasa)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn tasas_iva(pool: &PgPool) -> ServiceResult<Vec<TasaIva>> {
    let rows = sqlx::query_as::<_, TasaIva>(
        "SELECT id, tasa, descripcion, tipo, estado, fecha_actualizacion \
         FROM tasas_iva WHERE estado = 'Activa' ORDER BY tasa DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── Payment methods ──

const METODO_SELECT: &str = "SELECT metodo_id AS id, nombre, habilitado FROM metodos_pago_config";

/// All payment methods; the defaults are seeded when the table is empty.
pub async fn metodos_pago(pool: &PgPool) -> ServiceResult<Vec<MetodoPago>> {
    let rows = sqlx::query_as::<_, MetodoPago>(&format!("{METODO_SELECT} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    if !rows.is_empty() {
        return Ok(rows);
    }

    tracing::info!("Seeding default payment methods");
    let (ids, nombres): (Vec<&str>, Vec<&str>) = METODOS_PAGO_DEFAULT.iter().copied().unzip();
    sqlx::query(
        "INSERT INTO metodos_pago_config (metodo_id, nombre, habilitado) \
         SELECT m, n, TRUE FROM UNNEST($1::text[], $2::text[]) AS t(m, n) \
         ON CONFLICT (metodo_id) DO NOTHING",
    )
    .bind(&ids)
    .bind(&nombres)
    .execute(pool)
    .await?;

    let rows = sqlx::query_as::<_, MetodoPago>(&format!("{METODO_SELECT} ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn metodo_pago(pool: &PgPool, metodo_id: &str) -> ServiceResult<Option<MetodoPago>> {
    let row = sqlx::query_as::<_, MetodoPago>(&format!("{METODO_SELECT} WHERE metodo_id = $1"))
        .bind(metodo_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn set_metodo_habilitado(
    pool: &PgPool,
    metodo_id: &str,
    habilitado: bool,
) -> ServiceResult<Option<MetodoPago>> {
    let row = sqlx::query_as::<_, MetodoPago>(
        "UPDATE metodos_pago_config SET habilitado = $1, fecha_actualizacion = NOW() \
         WHERE metodo_id = $2 RETURNING metodo_id AS id, nombre, habilitado",
    )
    .bind(habilitado)
    .bind(metodo_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

// ── Dashboard ──

pub async fn dashboard_stats(pool: &PgPool) -> ServiceResult<DashboardStats> {
    let (total_productos, ventas_hoy, total_proveedores, productos_stock_minimo): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM productos WHERE estado = 'Activo'),
                (SELECT COUNT(*) FROM ventas
                  WHERE DATE(fecha_venta) = CURRENT_DATE AND estado = 'completada'),
                (SELECT COUNT(*) FROM proveedores),
                (SELECT COUNT(*) FROM productos WHERE stock <= stock_minimo AND estado = 'Activo')
            "#,
        )
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_productos,
        ventas_hoy,
        total_proveedores,
        productos_stock_minimo,
    })
}

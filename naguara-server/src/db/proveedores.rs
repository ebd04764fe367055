//! Proveedor database operations

use shared::models::{Proveedor, ProveedorInput};
use sqlx::PgPool;

use crate::error::ServiceResult;

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Proveedor>> {
    let rows = sqlx::query_as::<_, Proveedor>(
        "SELECT id, nombre, contacto, direccion FROM proveedores ORDER BY nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, data: &ProveedorInput) -> ServiceResult<Proveedor> {
    let row = sqlx::query_as::<_, Proveedor>(
        "INSERT INTO proveedores (nombre, contacto, direccion) VALUES ($1, $2, $3) \
         RETURNING id, nombre, contacto, direccion",
    )
    .bind(data.nombre.trim())
    .bind(&data.contacto)
    .bind(&data.direccion)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, id: i32, data: &ProveedorInput) -> ServiceResult<Option<Proveedor>> {
    let row = sqlx::query_as::<_, Proveedor>(
        "UPDATE proveedores SET nombre = $1, contacto = $2, direccion = $3 WHERE id = $4 \
         RETURNING id, nombre, contacto, direccion",
    )
    .bind(data.nombre.trim())
    .bind(&data.contacto)
    .bind(&data.direccion)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns false when the supplier does not exist.
pub async fn delete(pool: &PgPool, id: i32) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM proveedores WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

//! Cliente database operations

use shared::models::{Cliente, ClienteFiltro, ClienteInput, ESTADO_ACTIVO};
use sqlx::PgPool;

use crate::error::ServiceResult;

use super::like_pattern;

const CLIENTE_COLUMNS: &str = "id, cedula_rif, nombre, telefono, direccion, estado";

/// Active clients matching the filter, by name
pub async fn search(pool: &PgPool, filtro: &ClienteFiltro) -> ServiceResult<Vec<Cliente>> {
    let rows = match filtro {
        ClienteFiltro::Todos => {
            sqlx::query_as::<_, Cliente>(&format!(
                "SELECT {CLIENTE_COLUMNS} FROM clientes WHERE estado = $1 ORDER BY nombre"
            ))
            .bind(ESTADO_ACTIVO)
            .fetch_all(pool)
            .await?
        }
        ClienteFiltro::Nombre(nombre) => {
            sqlx::query_as::<_, Cliente>(&format!(
                "SELECT {CLIENTE_COLUMNS} FROM clientes \
                 WHERE estado = $1 AND (nombre ILIKE $2 OR direccion ILIKE $2) ORDER BY nombre"
            ))
            .bind(ESTADO_ACTIVO)
            .bind(like_pattern(nombre))
            .fetch_all(pool)
            .await?
        }
        ClienteFiltro::Cedula(cedula) => {
            sqlx::query_as::<_, Cliente>(&format!(
                "SELECT {CLIENTE_COLUMNS} FROM clientes \
                 WHERE estado = $1 AND cedula_rif ILIKE $2 ORDER BY nombre"
            ))
            .bind(ESTADO_ACTIVO)
            .bind(like_pattern(cedula))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// Active client with exactly this cédula/RIF
pub async fn find_by_cedula(pool: &PgPool, cedula_rif: &str) -> ServiceResult<Option<Cliente>> {
    let row = sqlx::query_as::<_, Cliente>(&format!(
        "SELECT {CLIENTE_COLUMNS} FROM clientes WHERE cedula_rif = $1 AND estado = $2"
    ))
    .bind(cedula_rif)
    .bind(ESTADO_ACTIVO)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn cedula_exists(pool: &PgPool, cedula_rif: &str, except_id: Option<i32>) -> ServiceResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM clientes WHERE cedula_rif = $1 AND ($2::INT IS NULL OR id <> $2))",
    )
    .bind(cedula_rif)
    .bind(except_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn create(pool: &PgPool, data: &ClienteInput) -> ServiceResult<Cliente> {
    let row = sqlx::query_as::<_, Cliente>(&format!(
        "INSERT INTO clientes (cedula_rif, nombre, telefono, direccion) \
         VALUES ($1, $2, $3, $4) RETURNING {CLIENTE_COLUMNS}"
    ))
    .bind(data.cedula_rif.trim())
    .bind(data.nombre.trim())
    .bind(&data.telefono)
    .bind(&data.direccion)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, id: i32, data: &ClienteInput) -> ServiceResult<Option<Cliente>> {
    let row = sqlx::query_as::<_, Cliente>(&format!(
        "UPDATE clientes SET cedula_rif = $1, nombre = $2, telefono = $3, direccion = $4 \
         WHERE id = $5 RETURNING {CLIENTE_COLUMNS}"
    ))
    .bind(data.cedula_rif.trim())
    .bind(data.nombre.trim())
    .bind(&data.telefono)
    .bind(&data.direccion)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

//! Categoria database operations

use shared::models::{Categoria, CategoriaInput};
use sqlx::PgPool;

use crate::error::ServiceResult;

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Categoria>> {
    let rows = sqlx::query_as::<_, Categoria>(
        "SELECT id, nombre, descripcion FROM categorias ORDER BY nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, data: &CategoriaInput) -> ServiceResult<Categoria> {
    let row = sqlx::query_as::<_, Categoria>(
        "INSERT INTO categorias (nombre, descripcion) VALUES ($1, $2) RETURNING id, nombre, descripcion",
    )
    .bind(data.nombre.trim())
    .bind(&data.descripcion)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, id: i32, data: &CategoriaInput) -> ServiceResult<Option<Categoria>> {
    let row = sqlx::query_as::<_, Categoria>(
        "UPDATE categorias SET nombre = $1, descripcion = $2 WHERE id = $3 RETURNING id, nombre, descripcion",
    )
    .bind(data.nombre.trim())
    .bind(&data.descripcion)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns false when the category does not exist.
pub async fn delete(pool: &PgPool, id: i32) -> ServiceResult<bool> {
    let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

//! Usuario database operations

use shared::models::{Rol, Usuario, UsuarioCredenciales, ESTADO_ACTIVO};
use sqlx::PgPool;

use crate::error::ServiceResult;

const USUARIO_COLUMNS: &str = "id, nombre, nombre_usuario, rol, estado, fecha_creacion";

pub async fn list(pool: &PgPool) -> ServiceResult<Vec<Usuario>> {
    let rows = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios ORDER BY nombre"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, id: i32) -> ServiceResult<Option<Usuario>> {
    let row = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Credentials of an active user, for login
pub async fn find_active_credentials(
    pool: &PgPool,
    nombre_usuario: &str,
) -> ServiceResult<Option<UsuarioCredenciales>> {
    let row = sqlx::query_as::<_, UsuarioCredenciales>(
        "SELECT id, nombre, rol, password FROM usuarios WHERE nombre_usuario = $1 AND estado = $2",
    )
    .bind(nombre_usuario)
    .bind(ESTADO_ACTIVO)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn username_exists(pool: &PgPool, nombre_usuario: &str) -> ServiceResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usuarios WHERE nombre_usuario = $1)")
            .bind(nombre_usuario)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn admin_exists(pool: &PgPool) -> ServiceResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usuarios WHERE rol = $1)")
            .bind(Rol::Administrador.as_str())
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Insert an active user; `password_hash` is already hashed.
pub async fn create(
    pool: &PgPool,
    nombre: &str,
    nombre_usuario: &str,
    password_hash: &str,
    rol: Rol,
) -> ServiceResult<Usuario> {
    let row = sqlx::query_as::<_, Usuario>(&format!(
        "INSERT INTO usuarios (nombre, nombre_usuario, password, rol, estado) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USUARIO_COLUMNS}"
    ))
    .bind(nombre)
    .bind(nombre_usuario)
    .bind(password_hash)
    .bind(rol.as_str())
    .bind(ESTADO_ACTIVO)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Update profile fields; the password only when a new hash is given.
pub async fn update(
    pool: &PgPool,
    id: i32,
    nombre: &str,
    nombre_usuario: &str,
    password_hash: Option<&str>,
    rol: Rol,
    estado: &str,
) -> ServiceResult<Option<Usuario>> {
    let row = sqlx::query_as::<_, Usuario>(&format!(
        "UPDATE usuarios SET nombre = $1, nombre_usuario = $2, \
         password = COALESCE($3, password), rol = $4, estado = $5 \
         WHERE id = $6 RETURNING {USUARIO_COLUMNS}"
    ))
    .bind(nombre)
    .bind(nombre_usuario)
    .bind(password_hash)
    .bind(rol.as_str())
    .bind(estado)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_estado(pool: &PgPool, id: i32, estado: &str) -> ServiceResult<Option<Usuario>> {
    let row = sqlx::query_as::<_, Usuario>(&format!(
        "UPDATE usuarios SET estado = $1 WHERE id = $2 RETURNING {USUARIO_COLUMNS}"
    ))
    .bind(estado)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

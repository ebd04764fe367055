//! User management (`/api/usuarios`)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    ESTADO_ACTIVO, ESTADO_INACTIVO, SessionUser, Usuario, UsuarioCreate, UsuarioEstadoUpdate,
    UsuarioUpdate,
};

use crate::auth::require_admin;
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, non_empty};

use super::ApiResult;
use super::auth::crear_usuario;
use super::extract::{AppJson, ValidatedJson};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/usuarios", get(list).post(create))
        .route("/api/usuarios/{id}", get(get_by_id).put(update))
        .route("/api/usuarios/{id}/estado", put(update_estado))
}

fn check_estado(estado: &str) -> Result<(), AppError> {
    if estado == ESTADO_ACTIVO || estado == ESTADO_INACTIVO {
        Ok(())
    } else {
        Err(AppError::validation("Estado inválido").with_detail("estado", estado))
    }
}

fn check_not_self_deactivation(user: &SessionUser, id: i32, estado: &str) -> Result<(), AppError> {
    if user.id == id && estado == ESTADO_INACTIVO {
        Err(AppError::new(ErrorCode::CannotDeactivateSelf))
    } else {
        Ok(())
    }
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Usuario>> {
    Ok(Json(db::usuarios::list(&state.pool).await?))
}

pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Usuario> {
    let usuario = db::usuarios::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(usuario))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    ValidatedJson(req): ValidatedJson<UsuarioCreate>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&user)?;
    let usuario = crear_usuario(&state, &req, req.rol.unwrap_or_default()).await?;
    tracing::info!(usuario_id = usuario.id, creado_por = user.id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Usuario creado exitosamente", "usuario": usuario })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UsuarioUpdate>,
) -> ApiResult<Value> {
    require_admin(&user)?;

    let actual = db::usuarios::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    let estado = req.estado.as_deref().unwrap_or(&actual.estado);
    check_estado(estado)?;
    check_not_self_deactivation(&user, id, estado)?;

    let hashed = match non_empty(req.password.as_deref()) {
        Some(password) => Some(hash_password(password).map_err(|e| {
            tracing::error!(error = %e, "Password hash error");
            AppError::new(ErrorCode::InternalError)
        })?),
        None => None,
    };

    let usuario = db::usuarios::update(
        &state.pool,
        id,
        req.nombre.trim(),
        req.nombre_usuario.trim(),
        hashed.as_deref(),
        req.rol,
        estado,
    )
    .await
    .map_err(|e| e.on_duplicate(AppError::new(ErrorCode::UsernameExists)))?
    .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    Ok(Json(json!({ "message": "Usuario actualizado correctamente", "usuario": usuario })))
}

pub async fn update_estado(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    AppJson(req): AppJson<UsuarioEstadoUpdate>,
) -> ApiResult<Value> {
    require_admin(&user)?;
    check_estado(&req.estado)?;
    check_not_self_deactivation(&user, id, &req.estado)?;

    let usuario = db::usuarios::set_estado(&state.pool, id, &req.estado)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    tracing::info!(usuario_id = id, estado = %req.estado, por = user.id, "User status changed");
    Ok(Json(json!({
        "message": format!("Usuario {} correctamente", req.estado.to_lowercase()),
        "usuario": usuario,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> SessionUser {
        SessionUser {
            id: 1,
            nombre: "Admin".into(),
            rol: "Administrador".into(),
        }
    }

    #[test]
    fn test_cannot_deactivate_self() {
        let err = check_not_self_deactivation(&admin(), 1, ESTADO_INACTIVO).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeactivateSelf);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert!(check_not_self_deactivation(&admin(), 1, ESTADO_ACTIVO).is_ok());
        assert!(check_not_self_deactivation(&admin(), 2, ESTADO_INACTIVO).is_ok());
    }

    #[test]
    fn test_check_estado() {
        assert!(check_estado("Activo").is_ok());
        assert!(check_estado("Inactivo").is_ok());
        assert!(check_estado("Borrado").is_err());
    }
}

//! Login, logout, registration and session introspection
//!
//! POST /register     - create a user (admin role only from an admin session)
//! POST /login        - verify credentials, set the session cookie
//! POST /logout       - expire the session cookie
//! GET  /api/me       - current session user (behind the auth gate)
//! GET  /api/sesion   - `{autenticado, usuario?}`, never 401

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, Rol, SessionUser, UsuarioCreate};

use crate::auth::{self, session};
use crate::db;
use crate::state::AppState;
use crate::util::{hash_password, verify_password};

use super::ApiResult;
use super::extract::{AppJson, ValidatedJson};

/// Routes outside the auth gate
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/sesion", get(sesion))
}

/// Routes behind the auth gate
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/api/me", get(me))
}

// ── POST /register ──

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<UsuarioCreate>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let rol = req.rol.unwrap_or_default();
    if rol.is_admin() {
        let caller = auth::session_user(&state, &headers).ok_or_else(AppError::admin_required)?;
        auth::require_admin(&caller)?;
    }

    let usuario = crear_usuario(&state, &req, rol).await?;
    tracing::info!(usuario_id = usuario.id, rol = %usuario.rol, "User registered");
    Ok((StatusCode::CREATED, Json(json!({ "usuario": usuario }))))
}

/// Shared by `/register` and `POST /api/usuarios`
pub(super) async fn crear_usuario(
    state: &AppState,
    req: &UsuarioCreate,
    rol: Rol,
) -> Result<shared::models::Usuario, AppError> {
    let nombre = req.nombre.trim();
    let nombre_usuario = req.nombre_usuario.trim();
    if nombre.is_empty() || nombre_usuario.is_empty() || req.password.is_empty() {
        return Err(AppError::required_fields());
    }

    if db::usuarios::username_exists(&state.pool, nombre_usuario).await? {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }

    let hashed = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "Password hash error");
        AppError::new(ErrorCode::InternalError)
    })?;

    let usuario = db::usuarios::create(&state.pool, nombre, nombre_usuario, &hashed, rol)
        .await
        .map_err(|e| e.on_duplicate(AppError::new(ErrorCode::UsernameExists)))?;
    Ok(usuario)
}

// ── POST /login ──

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let nombre_usuario = req.nombre_usuario.trim();
    if nombre_usuario.is_empty() || req.password.is_empty() {
        return Err(AppError::required_fields());
    }

    let credenciales = db::usuarios::find_active_credentials(&state.pool, nombre_usuario)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFoundOrInactive))?;

    if !verify_password(&req.password, &credenciales.password) {
        tracing::warn!(nombre_usuario = %nombre_usuario, "Login failed: wrong password");
        return Err(AppError::new(ErrorCode::WrongPassword));
    }

    let usuario = SessionUser {
        id: credenciales.id,
        nombre: credenciales.nombre,
        rol: credenciales.rol,
    };
    let config = &state.config;
    let token = session::create_token(&usuario, &config.session_secret, config.session_ttl)
        .map_err(|e| {
            tracing::error!(error = %e, "Session token error");
            AppError::new(ErrorCode::InternalError)
        })?;
    let cookie = session::session_cookie(
        &config.session_name,
        &token,
        config.session_ttl,
        config.is_production(),
    );

    tracing::info!(usuario_id = usuario.id, "Login");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({
            "mensaje": "Login exitoso",
            "usuario": usuario,
            "token": token,
        })),
    ))
}

// ── POST /logout ──

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, session::clear_cookie(&state.config.session_name))]),
        Json(json!({ "mensaje": "Sesión cerrada correctamente" })),
    )
}

// ── GET /api/me ──

pub async fn me(Extension(usuario): Extension<SessionUser>) -> ApiResult<SessionUser> {
    Ok(Json(usuario))
}

// ── GET /api/sesion ──

pub async fn sesion(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    match auth::session_user(&state, &headers) {
        Some(usuario) => Json(json!({ "autenticado": true, "usuario": usuario })),
        None => Json(json!({ "autenticado": false })),
    }
}

//! Session authentication for the `/api` surface

pub mod session;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::AppError;
use shared::models::SessionUser;

use crate::state::AppState;

/// Middleware that requires a valid session and stores the [`SessionUser`]
/// in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let user = session_user(&state, request.headers())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Session user of a request, if its token is present and valid
pub fn session_user(state: &AppState, headers: &http::HeaderMap) -> Option<SessionUser> {
    let token = session::token_from_headers(headers, &state.config.session_name)?;
    session::verify_token(&token, &state.config.session_secret)
        .map_err(|e| tracing::debug!("Session validation failed: {e}"))
        .ok()
}

/// Administrators only
pub fn require_admin(user: &SessionUser) -> Result<(), AppError> {
    if user.rol().is_admin() {
        Ok(())
    } else {
        Err(AppError::admin_required())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = SessionUser {
            id: 1,
            nombre: "Admin".into(),
            rol: "Administrador".into(),
        };
        let vendedor = SessionUser {
            rol: "Vendedor".into(),
            ..admin.clone()
        };
        assert!(require_admin(&admin).is_ok());
        let err = require_admin(&vendedor).unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }
}

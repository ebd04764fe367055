//! Session tokens and the session cookie
//!
//! A session is an HS256 JWT carrying the user id, name and role. It travels
//! in the `naguara.sid` cookie and is also accepted as a Bearer token.

use std::time::Duration;

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::SessionUser;

/// JWT claims of a session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub nombre: String,
    pub rol: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Create a session token for a user
pub fn create_token(
    user: &SessionUser,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1));
    let claims = SessionClaims {
        sub: user.id.to_string(),
        nombre: user.nombre.clone(),
        rol: user.rol.clone(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a session token and return the user it identifies
pub fn verify_token(token: &str, secret: &str) -> Result<SessionUser, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    let id = data
        .claims
        .sub
        .parse()
        .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject)?;
    Ok(SessionUser {
        id,
        nombre: data.claims.nombre,
        rol: data.claims.rol,
    })
}

/// Session token from the cookie, else from `Authorization: Bearer`
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_value(headers, cookie_name).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

/// `Set-Cookie` value establishing the session
pub fn session_cookie(name: &str, token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value expiring the session
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const SECRET: &str = "test-secret";

    fn user() -> SessionUser {
        SessionUser {
            id: 7,
            nombre: "Ana".into(),
            rol: "Administrador".into(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let token = create_token(&user(), SECRET, Duration::from_secs(3600)).unwrap();
        assert_eq!(verify_token(&token, SECRET).unwrap(), user());
    }

    #[test]
    fn test_token_wrong_secret() {
        let token = create_token(&user(), SECRET, Duration::from_secs(3600)).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: "7".into(),
            nombre: "Ana".into(),
            rol: "Vendedor".into(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_token_from_cookie_and_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; naguara.sid=abc.def"));
        assert_eq!(token_from_headers(&headers, "naguara.sid").as_deref(), Some("abc.def"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers, "naguara.sid").as_deref(), Some("xyz"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("naguara.sid="));
        assert_eq!(token_from_headers(&headers, "naguara.sid"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("naguara.sid", "tok", Duration::from_secs(3600), false);
        assert_eq!(
            cookie,
            "naguara.sid=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        assert!(session_cookie("naguara.sid", "tok", Duration::from_secs(1), true).ends_with("; Secure"));
        assert!(clear_cookie("naguara.sid").contains("Max-Age=0"));
    }
}

//! Unified service-layer error type for naguara-server
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so db functions and handlers can use `?`
//! without repeating `.map_err(...)` at every call site.
//!
//! PostgreSQL integrity violations are translated instead of being reported
//! as internal errors: `23505` becomes a 409 conflict and `23503` a 409
//! reference conflict.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQLSTATE unique_violation
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE foreign_key_violation
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, io, reqwest, etc.)
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl ServiceError {
    /// PostgreSQL SQLSTATE of the underlying database error, if any
    pub fn pg_code(&self) -> Option<String> {
        match self {
            ServiceError::Db(err) => err
                .downcast_ref::<sqlx::Error>()
                .and_then(|e| e.as_database_error())
                .and_then(|db| db.code())
                .map(|code| code.into_owned()),
            ServiceError::App(_) => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.pg_code().as_deref() == Some(PG_UNIQUE_VIOLATION)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.pg_code().as_deref() == Some(PG_FOREIGN_KEY_VIOLATION)
    }

    /// Replace a unique violation with a domain-specific error.
    pub fn on_duplicate(self, err: AppError) -> Self {
        if self.is_unique_violation() {
            ServiceError::App(err)
        } else {
            self
        }
    }

    /// Replace a foreign-key violation with a domain-specific error.
    pub fn on_reference(self, err: AppError) -> Self {
        if self.is_foreign_key_violation() {
            ServiceError::App(err)
        } else {
            self
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "{e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e.pg_code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => {
                return AppError::conflict("El registro ya existe");
            }
            Some(PG_FOREIGN_KEY_VIOLATION) => {
                return AppError::reference_conflict(
                    "El registro está referenciado por otros datos",
                );
            }
            _ => {}
        }
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

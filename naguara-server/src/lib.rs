//! Na'Guara server - point of sale and inventory API
//!
//! # Module layout
//!
//! ```text
//! naguara-server/src/
//! ├── api/        # HTTP routes and handlers
//! ├── auth/       # session tokens and the auth gate
//! ├── db/         # PostgreSQL queries, one module per table group
//! ├── services/   # exchange rate, invoices, backups
//! ├── config.rs   # environment configuration
//! ├── error.rs    # ServiceError bridge to AppError
//! ├── logger.rs   # tracing setup
//! └── state.rs    # shared application state
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod services;
pub mod state;
pub mod util;

pub use config::Config;
pub use error::{BoxError, ServiceError, ServiceResult};
pub use logger::{init_logger, init_logger_with_file};
pub use state::AppState;

use shared::models::Rol;

/// Username of the bootstrap administrator
pub const BOOTSTRAP_ADMIN: &str = "admin";

/// Create the `admin` account from `ADMIN_PASSWORD` when no administrator exists.
pub async fn bootstrap_admin(state: &AppState) -> ServiceResult<()> {
    let Some(password) = state.config.admin_password.as_deref() else {
        return Ok(());
    };
    if db::usuarios::admin_exists(&state.pool).await? {
        return Ok(());
    }

    let hash = util::hash_password(password).map_err(|e| ServiceError::Db(e.into()))?;
    let admin = db::usuarios::create(
        &state.pool,
        "Administrador",
        BOOTSTRAP_ADMIN,
        &hash,
        Rol::Administrador,
    )
    .await?;
    tracing::warn!(usuario_id = admin.id, "Bootstrap administrator created; change its password");
    Ok(())
}

/// Serve the API until the process receives Ctrl-C.
pub async fn run(state: AppState) -> Result<(), BoxError> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = %state.config.environment, "HTTP server listening");

    axum::serve(listener, api::build_app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

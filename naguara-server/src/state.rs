//! Application state for naguara-server

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::BoxError;
use crate::services::exchange_rate::{DolarApiSource, RateSource, fixed_source};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Immutable configuration
    pub config: Arc<Config>,
    /// Official exchange-rate provider
    pub rates: Arc<dyn RateSource>,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the rate client.
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let rates: Arc<dyn RateSource> =
            Arc::new(DolarApiSource::new(&config.fx_api_url, config.fx_timeout)?);

        Ok(Self {
            pool,
            config: Arc::new(config),
            rates,
        })
    }

    /// State over a lazily-connected pool; nothing touches the database
    /// until a query runs. The rate source never answers.
    pub fn lazy(config: Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_lazy(&config.database_url)?;
        Ok(Self {
            pool,
            config: Arc::new(config),
            rates: fixed_source(None),
        })
    }
}

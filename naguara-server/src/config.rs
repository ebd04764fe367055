//! Server configuration

use rust_decimal::Decimal;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_FX_API_URL: &str = "https://ve.dolarapi.com/v1/dolares/oficial";

/// Built-in Bs/USD rate used when neither the API nor the database has one (216.37)
pub const DEFAULT_FX_RATE: Decimal = Decimal::from_parts(21637, 0, 0, false, 2);

/// Minimum change (Bs) before a new rate row is stored (0.1)
pub const DEFAULT_FX_CHANGE_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Pool size
    pub db_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for session tokens
    pub session_secret: String,
    /// Session cookie name
    pub session_name: String,
    /// Session lifetime
    pub session_ttl: Duration,
    /// Allowed CORS origins (credentials enabled)
    pub cors_origins: Vec<String>,
    /// Official exchange-rate endpoint
    pub fx_api_url: String,
    pub fx_default_rate: Decimal,
    pub fx_change_threshold: Decimal,
    /// Background poll period
    pub fx_poll_interval: Duration,
    /// Per-request timeout of the exchange-rate client
    pub fx_timeout: Duration,
    /// Directory holding `.sql` backups
    pub backup_dir: String,
    /// `pg_dump` executable
    pub pg_dump_path: String,
    /// Daily-rolling log files go here when set
    pub log_dir: Option<String>,
    /// Password of the bootstrap `admin` account, created when no administrator exists
    pub admin_password: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            http_port: env_parse("HTTP_PORT", 3000),
            session_secret: Self::require_secret("SESSION_SECRET", &environment)?,
            environment,
            session_name: std::env::var("SESSION_NAME").unwrap_or_else(|_| "naguara.sid".into()),
            session_ttl: Duration::from_secs(env_parse("SESSION_TTL_SECS", 3600)),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| default_cors_origins()),
            fx_api_url: std::env::var("FX_API_URL").unwrap_or_else(|_| DEFAULT_FX_API_URL.into()),
            fx_default_rate: env_parse("FX_DEFAULT_RATE", DEFAULT_FX_RATE),
            fx_change_threshold: env_parse("FX_CHANGE_THRESHOLD", DEFAULT_FX_CHANGE_THRESHOLD),
            fx_poll_interval: Duration::from_secs(env_parse("FX_POLL_INTERVAL_SECS", 1800)),
            fx_timeout: Duration::from_secs(env_parse("FX_TIMEOUT_SECS", 10)),
            backup_dir: std::env::var("BACKUP_DIR").unwrap_or_else(|_| "backups".into()),
            pg_dump_path: std::env::var("PG_DUMP_PATH").unwrap_or_else(|_| "pg_dump".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Configuration for tests and local tooling (no environment access)
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            db_max_connections: 10,
            http_port: 3000,
            environment: "development".into(),
            session_secret: "dev-SESSION_SECRET-not-for-production".into(),
            session_name: "naguara.sid".into(),
            session_ttl: Duration::from_secs(3600),
            cors_origins: default_cors_origins(),
            fx_api_url: DEFAULT_FX_API_URL.into(),
            fx_default_rate: DEFAULT_FX_RATE,
            fx_change_threshold: DEFAULT_FX_CHANGE_THRESHOLD,
            fx_poll_interval: Duration::from_secs(1800),
            fx_timeout: Duration::from_secs(10),
            backup_dir: "backups".into(),
            pg_dump_path: "pg_dump".into(),
            log_dir: None,
            admin_password: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5500".into(),
        "http://127.0.0.1:5500".into(),
        "http://localhost:3000".into(),
    ]
}

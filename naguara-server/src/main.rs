use naguara_server::services::exchange_rate::spawn_rate_poller;
use naguara_server::{AppState, Config, bootstrap_admin, init_logger_with_file, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logger_with_file(config.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Na'Guara server starting...");

    // 2. Database pool and migrations
    let state = AppState::new(config).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to initialize application state");
    })?;

    if let Err(e) = bootstrap_admin(&state).await {
        tracing::error!(error = %e, "Failed to create bootstrap administrator");
    }

    // 3. Background exchange-rate poller
    spawn_rate_poller(state.clone());

    // 4. HTTP server
    if let Err(e) = run(state).await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }
    Ok(())
}

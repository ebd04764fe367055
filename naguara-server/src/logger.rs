//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the default filter. When a log directory is given the
//! output goes to a daily-rolling file instead of stdout.

use std::path::Path;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "naguara_server=info,tower_http=info";

/// Initialize the logger on stdout
pub fn init_logger() {
    init_logger_with_file(None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if (log_path.exists() || std::fs::create_dir_all(log_path).is_ok())
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "naguara-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}

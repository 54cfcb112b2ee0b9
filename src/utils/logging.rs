//! Logging configuration and setup

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// Returns the worker guard for the file appender when one is configured;
/// the caller must keep it alive for the lifetime of the process, otherwise
/// buffered log lines are dropped.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout));

    let guard = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "shopcast.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

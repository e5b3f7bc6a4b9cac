use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::AppError;

/// Install the global tracing subscriber for the host application.
///
/// `RUST_LOG` wins over `config.level` when it is set. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AppError::ConfigError(format!("invalid log filter '{}': {}", config.level, e)))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let result = if config.pretty {
        builder.pretty().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| AppError::InternalError(e.to_string()))
}

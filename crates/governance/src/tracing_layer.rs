//! Tracing subscriber configuration.

use deepfish_core::{config::LoggingConfig, Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: `RUST_LOG` wins over `logging.filter`,
/// and `logging.json` switches to structured JSON lines.
pub fn configure_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.filter, e)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    installed.map_err(|e| Error::config(format!("Failed to install tracing subscriber: {}", e)))
}

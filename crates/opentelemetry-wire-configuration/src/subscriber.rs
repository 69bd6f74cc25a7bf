//! `tracing` subscriber installation.

use crate::config::LoggingConfig;
use crate::error::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a global formatting subscriber.
///
/// `RUST_LOG` takes precedence over [`LoggingConfig::filter`].
///
/// # Errors
///
/// Returns [`ConfigError::Tracing`](crate::ConfigError::Tracing) if a global
/// subscriber is already set.
pub fn init_subscriber(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(config.with_target);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

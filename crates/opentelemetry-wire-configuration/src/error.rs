//! Error types for configuration loading and logging setup.

use thiserror::Error;

/// A specialised Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration or installing the
/// subscriber.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or did not match the schema.
    #[error("configuration error")]
    Figment(#[source] Box<figment::Error>),

    /// A global `tracing` subscriber was already installed.
    #[error("failed to initialise tracing")]
    Tracing(#[from] tracing_subscriber::util::TryInitError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

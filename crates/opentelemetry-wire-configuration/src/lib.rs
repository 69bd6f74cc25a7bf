//! Layered configuration for the propagation and aggregation crates.
//!
//! A single [`Config`] combines the `[propagation]`, `[collection]` and
//! `[logging]` sections, loaded with [figment](https://docs.rs/figment) from
//! defaults, an optional TOML file, the standard `OTEL_*` environment
//! variables and `OTEL_WIRE_*` overrides.
//!
//! # Example
//!
//! ```no_run
//! use opentelemetry_wire_configuration::{Config, ConfigError, init_subscriber};
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = Config::load()?;
//!     init_subscriber(&config.logging)?;
//!
//!     let propagator = config.propagator();
//!     let collector = config.collector();
//!     tracing::info!(
//!         propagators = propagator.len(),
//!         streams = collector.len(),
//!         "Configured"
//!     );
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod subscriber;

pub use config::{Config, ConfigBuilder, LoggingConfig};
pub use error::{ConfigError, Result};
pub use subscriber::init_subscriber;

pub use opentelemetry_wire_aggregation::{CollectionConfig, Temporality};
pub use opentelemetry_wire_propagation::{
    BaggageLimits, PropagationConfig, PropagatorKind, TraceStateLimits,
};

//! Configuration loading and management.
//!
//! Configuration is loaded from (in order of priority):
//! 1. Default values (compiled in)
//! 2. Config file: `otel-wire.toml` in the working directory (optional)
//! 3. Standard OpenTelemetry environment variables (`OTEL_*`)
//! 4. Crate-specific environment variables (`OTEL_WIRE_*`)
//!
//! # Supported Standard Environment Variables
//!
//! | Variable | Config Path | Description |
//! |----------|-------------|-------------|
//! | `OTEL_PROPAGATORS` | `propagation.propagators` | Comma-separated propagator names |
//! | `OTEL_METRIC_EXPORT_INTERVAL` | `collection.interval` | Collection interval in milliseconds |
//!
//! Crate-specific variables use `__` between path segments, for example
//! `OTEL_WIRE_COLLECTION__TEMPORALITY=cumulative` or
//! `OTEL_WIRE_PROPAGATION__BAGGAGE__MAX_ENTRIES=64`.

use crate::error::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use opentelemetry_wire_aggregation::{CollectionConfig, Collector, Temporality};
use opentelemetry_wire_propagation::{
    BaggageLimits, CompositePropagator, PropagationConfig, PropagatorKind, TraceStateLimits,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "otel-wire.toml";
const ENV_PREFIX: &str = "OTEL_WIRE_";

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            with_target: true,
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Header propagation settings.
    pub propagation: PropagationConfig,
    /// Metric collection settings.
    pub collection: CollectionConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration using a custom config file path.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_path.as_ref().exists() {
            figment = figment.merge(Toml::file(config_path));
        }

        figment = figment.merge(standard_otel_env());
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut config: Config = figment.extract()?;
        if config.collection.interval.is_zero() {
            tracing::warn!("Ignoring zero collection interval");
            config.collection.interval = CollectionConfig::default().interval;
        }
        Ok(config)
    }

    /// Creates a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Builds the configured propagator chain.
    pub fn propagator(&self) -> CompositePropagator {
        CompositePropagator::from_config(&self.propagation)
    }

    /// Creates an empty collector with the configured settings.
    pub fn collector(&self) -> Collector {
        Collector::new(self.collection.clone())
    }
}

/// Builder for constructing configuration programmatically.
#[must_use = "builders do nothing unless .build() is called"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new config builder with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Sets the propagators, in order.
    pub fn propagators(mut self, propagators: impl IntoIterator<Item = PropagatorKind>) -> Self {
        self.config.propagation.propagators = propagators.into_iter().collect();
        self
    }

    /// Sets the baggage extraction limits.
    pub fn baggage_limits(mut self, limits: BaggageLimits) -> Self {
        self.config.propagation.baggage = limits;
        self
    }

    /// Sets the trace state extraction limits.
    pub fn trace_state_limits(mut self, limits: TraceStateLimits) -> Self {
        self.config.propagation.trace_state = limits;
        self
    }

    /// Sets the collection interval.
    pub fn collection_interval(mut self, interval: Duration) -> Self {
        self.config.collection.interval = interval;
        self
    }

    /// Sets the collection temporality.
    pub fn temporality(mut self, temporality: Temporality) -> Self {
        self.config.collection.temporality = temporality;
        self
    }

    /// Sets the collector channel capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.collection.channel_capacity = capacity;
        self
    }

    /// Sets the default log filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.logging.filter = filter.into();
        self
    }

    /// Sets whether log lines include the event target.
    pub fn log_target(mut self, enabled: bool) -> Self {
        self.config.logging.with_target = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Serialize)]
struct PartialPropagationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    propagators: Option<Vec<PropagatorKind>>,
}

#[derive(Debug, Default, Serialize)]
struct PartialCollectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<u64>,
}

/// Partial config for standard OTEL env var overrides.
#[derive(Debug, Default, Serialize)]
struct PartialConfig {
    #[serde(skip_serializing_if = "is_partial_propagation_empty")]
    propagation: PartialPropagationConfig,
    #[serde(skip_serializing_if = "is_partial_collection_empty")]
    collection: PartialCollectionConfig,
}

fn is_partial_propagation_empty(config: &PartialPropagationConfig) -> bool {
    config.propagators.is_none()
}

fn is_partial_collection_empty(config: &PartialCollectionConfig) -> bool {
    config.interval.is_none()
}

fn standard_otel_env() -> Serialized<PartialConfig> {
    let mut config = PartialConfig::default();

    if let Ok(names) = std::env::var("OTEL_PROPAGATORS") {
        config.propagation.propagators = parse_propagators(&names);
    }

    if let Ok(interval) = std::env::var("OTEL_METRIC_EXPORT_INTERVAL") {
        match interval.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => config.collection.interval = Some(ms),
            _ => tracing::warn!(
                value = %interval,
                "Ignoring invalid OTEL_METRIC_EXPORT_INTERVAL"
            ),
        }
    }

    Serialized::defaults(config)
}

/// Parses an `OTEL_PROPAGATORS` list, dropping unknown names.
///
/// Returns `None` when no name is recognised so the defaults stay in place.
fn parse_propagators(names: &str) -> Option<Vec<PropagatorKind>> {
    let kinds: Vec<PropagatorKind> = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse() {
            Ok(kind) => Some(kind),
            Err(_) => {
                tracing::warn!(propagator = name, "Ignoring unknown propagator");
                None
            }
        })
        .collect();

    if kinds.is_empty() { None } else { Some(kinds) }
}

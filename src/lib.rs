//! OpenTelemetry wire workspace - integration tests for context propagation
//! and metric aggregation.
//!
//! This is a virtual package that provides workspace-level integration tests.
//! The actual functionality is provided by the workspace member crates:
//!
//! - `opentelemetry-wire-propagation`: W3C `baggage`, `traceparent` and
//!   `tracestate` codecs and propagators
//! - `opentelemetry-wire-aggregation`: thread-safe metric aggregators, streams
//!   and the periodic collector
//! - `opentelemetry-wire-configuration`: layered configuration and `tracing`
//!   subscriber setup

pub use opentelemetry_wire_aggregation as aggregation;
pub use opentelemetry_wire_configuration as configuration;
pub use opentelemetry_wire_propagation as propagation;

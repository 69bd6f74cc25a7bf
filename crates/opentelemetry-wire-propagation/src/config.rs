//! Propagation settings.
//!
//! These structs form the `[propagation]` section of the layered
//! configuration; every field has a W3C-conformant default.

use crate::error::PropagationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A propagator selectable by name, as in `OTEL_PROPAGATORS`.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagatorKind {
    /// W3C `traceparent` / `tracestate`.
    TraceContext,
    /// W3C `baggage`.
    Baggage,
    /// Disables propagation.
    None,
}

impl FromStr for PropagatorKind {
    type Err = PropagationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tracecontext" => Ok(Self::TraceContext),
            "baggage" => Ok(Self::Baggage),
            "none" => Ok(Self::None),
            _ => Err(PropagationError::invalid_argument("unknown propagator", s)),
        }
    }
}

/// Limits applied when extracting a `baggage` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaggageLimits {
    /// Longest accepted header, in bytes.
    pub max_header_bytes: usize,
    /// Most members accepted in one header.
    pub max_entries: usize,
}

impl Default for BaggageLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: 8192,
            max_entries: 180,
        }
    }
}

/// Limits applied when extracting a `tracestate` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceStateLimits {
    /// Longest accepted header, in bytes.
    pub max_header_bytes: usize,
    /// Most list members accepted.
    pub max_members: usize,
}

impl Default for TraceStateLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: 512,
            max_members: 32,
        }
    }
}

/// Which propagators run, in order, and their limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Propagators in injection and extraction order.
    pub propagators: Vec<PropagatorKind>,
    /// Baggage extraction limits.
    pub baggage: BaggageLimits,
    /// Trace state extraction limits.
    pub trace_state: TraceStateLimits,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            propagators: vec![PropagatorKind::TraceContext, PropagatorKind::Baggage],
            baggage: BaggageLimits::default(),
            trace_state: TraceStateLimits::default(),
        }
    }
}

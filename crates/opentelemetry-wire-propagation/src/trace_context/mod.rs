//! W3C Trace Context: identifiers, span context and the `traceparent` /
//! `tracestate` codecs.

mod propagator;
mod traceparent;
mod tracestate;

pub use propagator::{TRACEPARENT_HEADER, TRACESTATE_HEADER, TraceContextPropagator};
pub use traceparent::{TRACEPARENT_HEADER_SIZE, TraceParent};
pub use tracestate::{TraceState, TraceStateBuilder};

use crate::error::{PropagationError, Result};
use crate::hex_codec;
use std::fmt;
use std::str::FromStr;

/// A 16-byte trace identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId([u8; 16]);

impl TraceId {
    /// The all-zero, invalid trace id.
    pub const INVALID: TraceId = TraceId([0; 16]);

    /// Wraps raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns `false` for the all-zero id.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// An 8-byte span identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId([u8; 8]);

impl SpanId {
    /// The all-zero, invalid span id.
    pub const INVALID: SpanId = SpanId([0; 8]);

    /// Wraps raw bytes.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0
    }

    /// Returns `false` for the all-zero id.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

macro_rules! hex_id_text {
    ($id:ident, $len:expr) => {
        impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex_codec::encode(&self.0))
            }
        }

        impl FromStr for $id {
            type Err = PropagationError;

            /// Parses exactly `2 * len` lowercase hex characters.
            fn from_str(s: &str) -> Result<Self> {
                if s.len() != $len * hex_codec::BYTE_BASE16 {
                    return Err(PropagationError::invalid_argument(
                        concat!(stringify!($id), " has the wrong length"),
                        s,
                    ));
                }
                hex_codec::validate_lowercase(s, 0, s.len())?;
                let mut bytes = [0u8; $len];
                hex_codec::decode_into(s, 0, &mut bytes)?;
                Ok(Self(bytes))
            }
        }
    };
}

hex_id_text!(TraceId, 16);
hex_id_text!(SpanId, 8);

/// Trace flags byte; bit 0 is the sampled flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TraceFlags(u8);

impl TraceFlags {
    /// No flags set.
    pub const NOT_SAMPLED: TraceFlags = TraceFlags(0x00);
    /// Sampled flag set.
    pub const SAMPLED: TraceFlags = TraceFlags(0x01);

    /// Wraps a raw flags byte.
    pub const fn new(flags: u8) -> Self {
        Self(flags)
    }

    /// Returns the raw byte.
    pub const fn to_u8(self) -> u8 {
        self.0
    }

    /// Returns whether the sampled bit is set.
    pub const fn is_sampled(self) -> bool {
        self.0 & Self::SAMPLED.0 == Self::SAMPLED.0
    }

    /// Returns a copy with the sampled bit set to `sampled`.
    #[must_use]
    pub const fn with_sampled(self, sampled: bool) -> Self {
        if sampled {
            Self(self.0 | Self::SAMPLED.0)
        } else {
            Self(self.0 & !Self::SAMPLED.0)
        }
    }
}

impl fmt::Display for TraceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Identity of a span as carried between processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    trace_flags: TraceFlags,
    trace_state: TraceState,
    is_remote: bool,
}

impl SpanContext {
    /// Creates a span context.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        trace_flags: TraceFlags,
        trace_state: TraceState,
        is_remote: bool,
    ) -> Self {
        Self {
            trace_id,
            span_id,
            trace_flags,
            trace_state,
            is_remote,
        }
    }

    /// The invalid span context: zero ids, no flags, empty state.
    pub fn invalid() -> Self {
        Self::new(
            TraceId::INVALID,
            SpanId::INVALID,
            TraceFlags::NOT_SAMPLED,
            TraceState::default(),
            false,
        )
    }

    /// Trace id.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Span id.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Trace flags.
    pub fn trace_flags(&self) -> TraceFlags {
        self.trace_flags
    }

    /// Vendor trace state.
    pub fn trace_state(&self) -> &TraceState {
        &self.trace_state
    }

    /// Whether this context was extracted from a remote parent.
    pub fn is_remote(&self) -> bool {
        self.is_remote
    }

    /// Whether the sampled flag is set.
    pub fn is_sampled(&self) -> bool {
        self.trace_flags.is_sampled()
    }

    /// Both ids are non-zero.
    pub fn is_valid(&self) -> bool {
        self.trace_id.is_valid() && self.span_id.is_valid()
    }
}

impl Default for SpanContext {
    fn default() -> Self {
        Self::invalid()
    }
}

impl From<&SpanContext> for opentelemetry::trace::SpanContext {
    fn from(sc: &SpanContext) -> Self {
        let trace_state = opentelemetry::trace::TraceState::from_key_value(
            sc.trace_state.iter().map(|(k, v)| (k.to_owned(), v.to_owned())),
        )
        .unwrap_or_default();

        opentelemetry::trace::SpanContext::new(
            opentelemetry::trace::TraceId::from_bytes(sc.trace_id.to_bytes()),
            opentelemetry::trace::SpanId::from_bytes(sc.span_id.to_bytes()),
            opentelemetry::trace::TraceFlags::new(sc.trace_flags.to_u8()),
            sc.is_remote,
            trace_state,
        )
    }
}

impl From<&opentelemetry::trace::SpanContext> for SpanContext {
    fn from(sc: &opentelemetry::trace::SpanContext) -> Self {
        let trace_state = TraceState::parse(&sc.trace_state().header()).unwrap_or_default();
        Self::new(
            TraceId::from_bytes(sc.trace_id().to_bytes()),
            SpanId::from_bytes(sc.span_id().to_bytes()),
            TraceFlags::new(sc.trace_flags().to_u8()),
            trace_state,
            sc.is_remote(),
        )
    }
}

//! W3C Baggage and Trace Context header codecs.
//!
//! This crate parses and writes the `baggage`, `traceparent` and
//! `tracestate` headers used to carry distributed-tracing context between
//! services. Codecs are plain functions over `&str` with no shared state, so
//! they can be called from any number of request threads at once.
//!
//! # Architecture
//!
//! Leaf codecs ([`hex_codec`], [`percent`]) feed the header parsers
//! ([`Baggage::parse`], [`TraceParent::decode`], [`TraceState::parse`]).
//! Propagators wrap the parsers behind the [`TextMapPropagator`] trait and
//! talk to carriers through the `opentelemetry` [`Extractor`] and
//! [`Injector`] traits.
//!
//! Malformed input never surfaces as an error from a propagator: a bad
//! `traceparent` yields an invalid span context, a bad `baggage` header yields
//! no baggage, and a bad `tracestate` only drops the state.
//!
//! # Usage
//!
//! ```
//! use opentelemetry_wire_propagation::{CompositePropagator, HeaderCarrier, TextMapPropagator};
//!
//! let propagator = CompositePropagator::default();
//!
//! let incoming: HeaderCarrier = [
//!     ("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
//!     ("baggage", "userId=alice,isProduction=false"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let cx = propagator.extract(&incoming);
//! assert!(cx.span_context.is_sampled());
//! assert_eq!(cx.baggage.get("userId"), Some("alice"));
//!
//! let mut outgoing = HeaderCarrier::new();
//! propagator.inject_context(&cx, &mut outgoing);
//! assert_eq!(outgoing.len(), 2);
//! ```
//!
//! [`Extractor`]: opentelemetry::propagation::Extractor
//! [`Injector`]: opentelemetry::propagation::Injector

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod baggage;
pub mod carrier;
pub mod config;
pub mod error;
pub mod hex_codec;
pub mod percent;
pub mod propagator;
pub mod trace_context;

pub use baggage::{Baggage, BaggageEntry, BaggageParser, BaggagePropagator, ParseOutcome};
pub use carrier::HeaderCarrier;
pub use config::{BaggageLimits, PropagationConfig, PropagatorKind, TraceStateLimits};
pub use error::{PropagationError, Result};
pub use propagator::{CompositePropagator, PropagationContext, TextMapPropagator};
pub use trace_context::{
    SpanContext, SpanId, TraceContextPropagator, TraceFlags, TraceId, TraceParent, TraceState,
};

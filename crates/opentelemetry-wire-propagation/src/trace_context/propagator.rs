use super::{SpanContext, TraceParent, TraceState};
use crate::config::TraceStateLimits;
use crate::propagator::{PropagationContext, TextMapPropagator};
use opentelemetry::propagation::{Extractor, Injector};

/// Header carrying version, trace id, parent span id and flags.
pub const TRACEPARENT_HEADER: &str = "traceparent";
/// Header carrying vendor-specific trace state.
pub const TRACESTATE_HEADER: &str = "tracestate";

const FIELDS: [&str; 2] = [TRACEPARENT_HEADER, TRACESTATE_HEADER];

/// Propagates a [`SpanContext`] through W3C `traceparent` and `tracestate`.
///
/// A missing or malformed `traceparent` leaves the incoming context
/// unchanged, so extracting into an empty context yields
/// [`SpanContext::invalid`]. A malformed `tracestate` only drops the state.
#[derive(Debug, Clone, Default)]
pub struct TraceContextPropagator {
    limits: TraceStateLimits,
}

impl TraceContextPropagator {
    /// Creates a propagator with the default W3C tracestate limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a propagator enforcing `limits` on `tracestate`.
    pub fn with_limits(limits: TraceStateLimits) -> Self {
        Self { limits }
    }

    /// Extracts a remote span context, or [`SpanContext::invalid`].
    pub fn extract_span_context(&self, extractor: &dyn Extractor) -> SpanContext {
        let Some(header) = extractor.get(TRACEPARENT_HEADER) else {
            return SpanContext::invalid();
        };
        let traceparent = match TraceParent::decode(header.trim()) {
            Ok(tp) => tp,
            Err(err) => {
                tracing::debug!(error = %err, "Unparseable traceparent header");
                return SpanContext::invalid();
            }
        };

        let trace_state = match extractor.get(TRACESTATE_HEADER) {
            Some(header) => {
                TraceState::parse_with_limits(header, &self.limits).unwrap_or_else(|err| {
                    tracing::debug!(error = %err, "Discarding tracestate header");
                    TraceState::default()
                })
            }
            None => TraceState::default(),
        };

        SpanContext::new(
            traceparent.trace_id,
            traceparent.span_id,
            traceparent.trace_flags,
            trace_state,
            true,
        )
    }
}

impl TextMapPropagator for TraceContextPropagator {
    fn inject_context(&self, cx: &PropagationContext, injector: &mut dyn Injector) {
        let sc = &cx.span_context;
        if !sc.is_valid() {
            return;
        }

        match TraceParent::new(sc.trace_id(), sc.span_id(), sc.trace_flags()).encode() {
            Ok(header) => injector.set(TRACEPARENT_HEADER, header),
            Err(err) => {
                tracing::debug!(error = %err, "Failed to encode traceparent");
                return;
            }
        }
        if let Some(state) = sc.trace_state().to_header() {
            injector.set(TRACESTATE_HEADER, state);
        }
    }

    fn extract_with_context(
        &self,
        cx: &PropagationContext,
        extractor: &dyn Extractor,
    ) -> PropagationContext {
        let span_context = self.extract_span_context(extractor);
        if !span_context.is_valid() {
            return cx.clone();
        }
        PropagationContext {
            span_context,
            baggage: cx.baggage.clone(),
        }
    }

    fn fields(&self) -> &[&'static str] {
        &FIELDS
    }
}

//! Text-map propagator abstraction and the composite propagator.

use crate::baggage::{Baggage, BaggagePropagator};
use crate::config::{PropagationConfig, PropagatorKind};
use crate::trace_context::{SpanContext, TraceContextPropagator};
use opentelemetry::propagation::{Extractor, Injector};
use std::fmt;

/// Context values carried across process boundaries in text headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationContext {
    /// Remote parent span, invalid if none was extracted.
    pub span_context: SpanContext,
    /// Application baggage.
    pub baggage: Baggage,
}

impl PropagationContext {
    /// Creates a context holding only `span_context`.
    pub fn with_span_context(span_context: SpanContext) -> Self {
        Self {
            span_context,
            baggage: Baggage::default(),
        }
    }

    /// Creates a context holding only `baggage`.
    pub fn with_baggage(baggage: Baggage) -> Self {
        Self {
            span_context: SpanContext::invalid(),
            baggage,
        }
    }
}

/// Reads and writes a [`PropagationContext`] through header carriers.
///
/// Extraction never fails: malformed headers leave the corresponding part of
/// the context untouched.
pub trait TextMapPropagator: fmt::Debug + Send + Sync {
    /// Writes the relevant parts of `cx` into `injector`.
    fn inject_context(&self, cx: &PropagationContext, injector: &mut dyn Injector);

    /// Returns `cx` updated with whatever this propagator finds in `extractor`.
    fn extract_with_context(
        &self,
        cx: &PropagationContext,
        extractor: &dyn Extractor,
    ) -> PropagationContext;

    /// Extracts into an empty context.
    fn extract(&self, extractor: &dyn Extractor) -> PropagationContext {
        self.extract_with_context(&PropagationContext::default(), extractor)
    }

    /// Header names this propagator reads and writes.
    fn fields(&self) -> &[&'static str];
}

/// Runs several propagators in order.
///
/// Injection writes every propagator's headers; extraction threads the
/// context through each propagator so later ones see earlier results.
#[derive(Debug)]
pub struct CompositePropagator {
    propagators: Vec<Box<dyn TextMapPropagator>>,
    fields: Vec<&'static str>,
}

impl CompositePropagator {
    /// Creates a composite over `propagators`.
    pub fn new(propagators: Vec<Box<dyn TextMapPropagator>>) -> Self {
        let mut fields = Vec::new();
        for field in propagators.iter().flat_map(|p| p.fields().iter().copied()) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self {
            propagators,
            fields,
        }
    }

    /// Builds the propagators listed in `config`, in order.
    ///
    /// `none` entries contribute nothing and duplicates are ignored.
    pub fn from_config(config: &PropagationConfig) -> Self {
        let mut seen = Vec::new();
        let mut propagators: Vec<Box<dyn TextMapPropagator>> = Vec::new();
        for kind in &config.propagators {
            if seen.contains(kind) {
                continue;
            }
            seen.push(*kind);
            match kind {
                PropagatorKind::TraceContext => propagators.push(Box::new(
                    TraceContextPropagator::with_limits(config.trace_state.clone()),
                )),
                PropagatorKind::Baggage => propagators.push(Box::new(
                    BaggagePropagator::with_limits(config.baggage.clone()),
                )),
                PropagatorKind::None => {}
            }
        }
        Self::new(propagators)
    }

    /// Number of wrapped propagators.
    pub fn len(&self) -> usize {
        self.propagators.len()
    }

    /// Returns `true` if no propagator is wrapped.
    pub fn is_empty(&self) -> bool {
        self.propagators.is_empty()
    }
}

impl Default for CompositePropagator {
    /// W3C trace context followed by W3C baggage.
    fn default() -> Self {
        Self::from_config(&PropagationConfig::default())
    }
}

impl TextMapPropagator for CompositePropagator {
    fn inject_context(&self, cx: &PropagationContext, injector: &mut dyn Injector) {
        for propagator in &self.propagators {
            propagator.inject_context(cx, injector);
        }
    }

    fn extract_with_context(
        &self,
        cx: &PropagationContext,
        extractor: &dyn Extractor,
    ) -> PropagationContext {
        self.propagators
            .iter()
            .fold(cx.clone(), |acc, propagator| {
                propagator.extract_with_context(&acc, extractor)
            })
    }

    fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_context::{SpanId, TraceFlags, TraceId, TraceState};
    use std::collections::HashMap;

    fn sample_context() -> PropagationContext {
        let mut baggage = Baggage::new();
        baggage.insert_with_metadata("user", "alice smith", "pii");
        PropagationContext {
            span_context: SpanContext::new(
                TraceId::from_bytes([0x4b; 16]),
                SpanId::from_bytes([0x00, 0xf0, 0x67, 0xaa, 0x0b, 0xa9, 0x02, 0xb7]),
                TraceFlags::SAMPLED,
                TraceState::parse("vendor=x").unwrap(),
                true,
            ),
            baggage,
        }
    }

    #[test]
    fn test_default_fields() {
        let propagator = CompositePropagator::default();
        assert_eq!(
            propagator.fields(),
            &["traceparent", "tracestate", "baggage"]
        );
    }

    #[test]
    fn test_roundtrip_through_hashmap() {
        let propagator = CompositePropagator::default();
        let mut carrier: HashMap<String, String> = HashMap::new();
        propagator.inject_context(&sample_context(), &mut carrier);

        assert_eq!(
            carrier.get("traceparent").map(String::as_str),
            Some("00-4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b4b-00f067aa0ba902b7-01")
        );
        assert_eq!(
            carrier.get("baggage").map(String::as_str),
            Some("user=alice%20smith;pii")
        );

        let extracted = propagator.extract(&carrier);
        assert_eq!(extracted, sample_context());
    }

    #[test]
    fn test_from_config_respects_order_and_none() {
        let config = PropagationConfig {
            propagators: vec![
                PropagatorKind::Baggage,
                PropagatorKind::None,
                PropagatorKind::Baggage,
            ],
            ..PropagationConfig::default()
        };
        let propagator = CompositePropagator::from_config(&config);
        assert_eq!(propagator.len(), 1);
        assert_eq!(propagator.fields(), &["baggage"]);
    }

    #[test]
    fn test_empty_composite_is_noop() {
        let propagator = CompositePropagator::new(Vec::new());
        let mut carrier: HashMap<String, String> = HashMap::new();
        propagator.inject_context(&sample_context(), &mut carrier);
        assert!(carrier.is_empty());
        assert!(propagator.is_empty());
        assert_eq!(propagator.extract(&carrier), PropagationContext::default());
    }

    #[test]
    fn test_extract_keeps_existing_values_on_missing_headers() {
        let propagator = CompositePropagator::default();
        let carrier: HashMap<String, String> = HashMap::new();
        let cx = sample_context();
        assert_eq!(propagator.extract_with_context(&cx, &carrier), cx);
    }
}

use super::Baggage;
use crate::config::BaggageLimits;
use crate::propagator::{PropagationContext, TextMapPropagator};
use opentelemetry::propagation::{Extractor, Injector};

/// Header carrying W3C baggage.
pub const BAGGAGE_HEADER: &str = "baggage";

const FIELDS: [&str; 1] = [BAGGAGE_HEADER];

/// Propagates [`Baggage`] through the `baggage` header.
///
/// Extraction is all-or-nothing: a header that breaks the configured limits
/// yields no baggage at all, while individual malformed members are simply
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct BaggagePropagator {
    limits: BaggageLimits,
}

impl BaggagePropagator {
    /// Creates a propagator with the default W3C limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a propagator enforcing `limits` on extraction.
    pub fn with_limits(limits: BaggageLimits) -> Self {
        Self { limits }
    }
}

impl TextMapPropagator for BaggagePropagator {
    fn inject_context(&self, cx: &PropagationContext, injector: &mut dyn Injector) {
        if let Some(header) = cx.baggage.to_header() {
            injector.set(BAGGAGE_HEADER, header);
        }
    }

    fn extract_with_context(
        &self,
        cx: &PropagationContext,
        extractor: &dyn Extractor,
    ) -> PropagationContext {
        let Some(header) = extractor.get(BAGGAGE_HEADER) else {
            return cx.clone();
        };
        if header.trim().is_empty() {
            return cx.clone();
        }

        match Baggage::parse_with_limits(header, &self.limits) {
            Ok(baggage) => PropagationContext {
                span_context: cx.span_context.clone(),
                baggage,
            },
            Err(err) => {
                tracing::debug!(error = %err, "Discarding baggage header");
                cx.clone()
            }
        }
    }

    fn fields(&self) -> &[&'static str] {
        &FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn carrier(header: &str) -> HashMap<String, String> {
        HashMap::from([(BAGGAGE_HEADER.to_string(), header.to_string())])
    }

    #[test]
    fn test_extract_skips_invalid_members() {
        let cx = BaggagePropagator::new().extract(&carrier("valid=ok,=bad,another=fine"));
        let keys: Vec<_> = cx.baggage.iter().map(|(k, e)| (k, e.value.as_str())).collect();
        assert_eq!(keys, vec![("another", "fine"), ("valid", "ok")]);
    }

    #[test]
    fn test_extract_over_limit_yields_nothing() {
        let propagator = BaggagePropagator::with_limits(BaggageLimits {
            max_entries: 1,
            ..BaggageLimits::default()
        });
        let cx = propagator.extract(&carrier("a=1,b=2"));
        assert!(cx.baggage.is_empty());
    }

    #[test]
    fn test_extract_replaces_existing_baggage() {
        let mut existing = Baggage::new();
        existing.insert("old", "1");
        let cx = PropagationContext::with_baggage(existing);

        let extracted = BaggagePropagator::new().extract_with_context(&cx, &carrier("new=2"));
        assert_eq!(extracted.baggage.get("new"), Some("2"));
        assert_eq!(extracted.baggage.get("old"), None);
    }

    #[test]
    fn test_extract_missing_or_blank_header_keeps_context() {
        let mut existing = Baggage::new();
        existing.insert("old", "1");
        let cx = PropagationContext::with_baggage(existing);

        let empty: HashMap<String, String> = HashMap::new();
        assert_eq!(BaggagePropagator::new().extract_with_context(&cx, &empty), cx);
        assert_eq!(
            BaggagePropagator::new().extract_with_context(&cx, &carrier("  ")),
            cx
        );
    }

    #[test]
    fn test_inject_skips_empty_baggage() {
        let mut out: HashMap<String, String> = HashMap::new();
        BaggagePropagator::new().inject_context(&PropagationContext::default(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_inject_writes_header() {
        let mut baggage = Baggage::new();
        baggage.insert("k", "v w");
        let mut out: HashMap<String, String> = HashMap::new();
        let cx = PropagationContext::with_baggage(baggage);
        BaggagePropagator::new().inject_context(&cx, &mut out);
        assert_eq!(out.get(BAGGAGE_HEADER).map(String::as_str), Some("k=v%20w"));
    }
}

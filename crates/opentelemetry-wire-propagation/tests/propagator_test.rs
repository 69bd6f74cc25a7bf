//! End-to-end propagator tests over real header carriers.

use opentelemetry::propagation::Extractor;
use opentelemetry_wire_propagation::{
    Baggage, BaggagePropagator, CompositePropagator, HeaderCarrier, PropagationConfig,
    PropagationContext, PropagatorKind, SpanContext, SpanId, TextMapPropagator,
    TraceContextPropagator, TraceFlags, TraceId, TraceState,
};
use std::collections::HashMap;

const TRACE_ID: TraceId = TraceId::from_bytes([
    0x4b, 0xf9, 0x2f, 0x35, 0x77, 0xb3, 0x4d, 0xa6, 0xa3, 0xce, 0x92, 0x9d, 0x0e, 0x0e, 0x47, 0x36,
]);
const SPAN_ID: SpanId = SpanId::from_bytes([0x00, 0xf0, 0x67, 0xaa, 0x0b, 0xa9, 0x02, 0xb7]);

fn expected(flags: u8, state: &str) -> SpanContext {
    SpanContext::new(
        TRACE_ID,
        SPAN_ID,
        TraceFlags::new(flags),
        TraceState::parse(state).unwrap(),
        true,
    )
}

#[rustfmt::skip]
fn extract_data() -> Vec<(&'static str, &'static str, SpanContext)> {
    vec![
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00", "foo=bar", expected(0x00, "foo=bar")),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01", "foo=bar", expected(0x01, "foo=bar")),
        ("02-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01", "foo=bar", expected(0x01, "foo=bar")),
        ("02-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-09", "foo=bar", expected(0x09, "foo=bar")),
        ("02-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-08", "foo=bar", expected(0x08, "foo=bar")),
        ("02-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-09-XYZxsf09", "foo=bar", expected(0x09, "foo=bar")),
        ("01-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-09-", "foo=bar", expected(0x09, "foo=bar")),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01", "", expected(0x01, "")),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01", "a=1, b=2 ,c=3", expected(0x01, "a=1,b=2,c=3")),
    ]
}

#[rustfmt::skip]
fn extract_data_invalid() -> Vec<(&'static str, &'static str)> {
    vec![
        ("0000-00000000000000000000000000000000-0000000000000000-01", "wrong version length"),
        ("00-ab00000000000000000000000000000000-cd00000000000000-01", "wrong trace ID length"),
        ("00-ab000000000000000000000000000000-cd0000000000000000-01", "wrong span ID length"),
        ("00-ab000000000000000000000000000000-cd00000000000000-0100", "wrong trace flag length"),
        ("qw-00000000000000000000000000000000-0000000000000000-01",   "bogus version"),
        ("00-qw000000000000000000000000000000-cd00000000000000-01",   "bogus trace ID"),
        ("00-ab000000000000000000000000000000-qw00000000000000-01",   "bogus span ID"),
        ("00-ab000000000000000000000000000000-cd00000000000000-qw",   "bogus trace flag"),
        ("A0-00000000000000000000000000000000-0000000000000000-01",   "upper case version"),
        ("00-AB000000000000000000000000000000-cd00000000000000-01",   "upper case trace ID"),
        ("00-ab000000000000000000000000000000-CD00000000000000-01",   "upper case span ID"),
        ("00-ab000000000000000000000000000000-cd00000000000000-A1",   "upper case trace flag"),
        ("00-00000000000000000000000000000000-0000000000000000-01",   "zero trace ID and span ID"),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7",      "missing options"),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-",     "empty options"),
        ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01-",  "version 00 with trailing data"),
        ("ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",   "forbidden version"),
    ]
}

fn carrier(traceparent: &str, tracestate: &str) -> HashMap<String, String> {
    HashMap::from([
        ("traceparent".to_string(), traceparent.to_string()),
        ("tracestate".to_string(), tracestate.to_string()),
    ])
}

#[test]
fn extract_w3c() {
    let propagator = TraceContextPropagator::new();
    for (traceparent, tracestate, expected) in extract_data() {
        let cx = propagator.extract(&carrier(traceparent, tracestate));
        assert_eq!(cx.span_context, expected, "{traceparent}");
    }
}

#[test]
fn extract_w3c_reject_invalid() {
    let propagator = TraceContextPropagator::new();
    for (traceparent, reason) in extract_data_invalid() {
        let cx = propagator.extract(&carrier(traceparent, "foo=bar"));
        assert_eq!(cx.span_context, SpanContext::invalid(), "{reason}");
    }
}

#[test]
fn inject_w3c() {
    let propagator = TraceContextPropagator::new();
    for (flags, traceparent) in [
        (0x01, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        (0x00, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00"),
        (0xff, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-ff"),
    ] {
        let cx = PropagationContext::with_span_context(expected(flags, "foo=bar"));
        let mut out = HeaderCarrier::new();
        propagator.inject_context(&cx, &mut out);
        assert_eq!(out.get("traceparent"), Some(traceparent));
        assert_eq!(out.get("tracestate"), Some("foo=bar"));
    }
}

#[test]
fn baggage_survives_hops() {
    let propagator = CompositePropagator::default();
    let mut baggage = Baggage::new();
    baggage.insert("user", "Jürgen Müller");
    baggage.insert_with_metadata("tenant", "a,b;c", "scope=internal");

    let mut cx = PropagationContext::with_baggage(baggage);
    for _ in 0..3 {
        let mut headers = HeaderCarrier::new();
        propagator.inject_context(&cx, &mut headers);
        cx = propagator.extract(&headers);
    }

    assert_eq!(cx.baggage.get("user"), Some("Jürgen Müller"));
    let tenant = cx.baggage.get_entry("tenant").unwrap();
    assert_eq!(tenant.value, "a,b;c");
    assert_eq!(tenant.metadata, "scope=internal");
    assert!(!cx.span_context.is_valid());
}

#[test]
fn headers_match_case_insensitively() {
    let headers: HeaderCarrier = [
        ("TraceParent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
        ("BAGGAGE", "k=v"),
    ]
    .into_iter()
    .collect();

    let cx = CompositePropagator::default().extract(&headers);
    assert_eq!(cx.span_context.trace_id(), TRACE_ID);
    assert_eq!(cx.baggage.get("k"), Some("v"));
}

#[test]
fn oversized_baggage_yields_no_baggage_but_keeps_trace() {
    let huge: Vec<String> = (0..200).map(|i| format!("k{i}=v")).collect();
    let headers: HeaderCarrier = [
        (
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01".to_string(),
        ),
        ("baggage", huge.join(",")),
    ]
    .into_iter()
    .collect();

    let cx = CompositePropagator::default().extract(&headers);
    assert!(cx.span_context.is_valid());
    assert!(cx.baggage.is_empty());
}

#[test]
fn configured_propagators_only_touch_their_headers() {
    let config = PropagationConfig {
        propagators: vec![PropagatorKind::Baggage],
        ..PropagationConfig::default()
    };
    let propagator = CompositePropagator::from_config(&config);

    let headers = carrier(
        "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
        "foo=bar",
    );
    let cx = propagator.extract(&headers);
    assert_eq!(cx.span_context, SpanContext::invalid());

    let standalone = BaggagePropagator::new();
    assert_eq!(propagator.fields(), standalone.fields());
}

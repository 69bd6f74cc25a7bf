//! Integration harness that runs all three crates together:
//! - configuration loaded from the environment
//! - incoming headers extracted by the configured propagators
//! - per-request measurements recorded from many threads
//! - the collector draining streams on its own task
//!
//! This mirrors a service that accepts traced requests and reports request
//! metrics labelled from baggage.

use opentelemetry::propagation::Extractor;
use opentelemetry_wire::aggregation::{
    Aggregator, AggregatorKind, InstrumentValueType, Labels, LongSumAggregator,
    LongSummaryAggregator, PointValue, Temporality, now_epoch_nanos,
};
use opentelemetry_wire::configuration::Config;
use opentelemetry_wire::propagation::{
    Baggage, HeaderCarrier, PropagationContext, SpanContext, SpanId, TextMapPropagator,
    TraceFlags, TraceId, TraceState,
};
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use temp_env::with_vars;
use tokio::sync::Notify;
use tokio::time::timeout;

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

fn incoming(tenant: &str) -> HeaderCarrier {
    [
        ("traceparent", TRACEPARENT.to_string()),
        ("tracestate", "congo=t61rcWkgMzE".to_string()),
        ("baggage", format!("tenant={tenant},userId=alice%40example.com")),
    ]
    .into_iter()
    .collect()
}

fn load_config() -> Config {
    Config::load_from_path("/nonexistent/otel-wire.toml").expect("config loads")
}

#[test]
#[serial]
fn headers_to_labelled_metrics() {
    let config = with_vars(
        [
            ("OTEL_PROPAGATORS", Some("tracecontext,baggage")),
            ("OTEL_WIRE_COLLECTION__TEMPORALITY", Some("delta")),
        ],
        load_config,
    );
    let propagator = config.propagator();
    let mut collector = config.collector();

    let mut handles = Vec::new();
    for tenant in ["acme", "globex"] {
        let cx = propagator.extract(&incoming(tenant));
        assert!(cx.span_context.is_sampled());
        assert_eq!(cx.baggage.get("userId"), Some("alice@example.com"));

        let labels = Labels::new().with("tenant", cx.baggage.get("tenant").unwrap_or("unknown"));
        let requests = collector.register(
            format!("requests.{tenant}"),
            labels,
            LongSumAggregator::default(),
        );
        handles.push(requests);
    }

    let workers: Vec<_> = handles
        .iter()
        .cloned()
        .enumerate()
        .flat_map(|(i, handle)| {
            (0..4).map(move |_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for _ in 0..(100 * (i + 1)) {
                        handle.record_long(1).unwrap();
                    }
                })
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let batch = collector.collect_once(now_epoch_nanos());
    let acme = batch.get("requests.acme").unwrap();
    let globex = batch.get("requests.globex").unwrap();
    assert_eq!(acme.value, PointValue::Long(400));
    assert_eq!(acme.labels.get("tenant"), Some("acme"));
    assert_eq!(globex.value, PointValue::Long(800));

    let next = collector.collect_once(now_epoch_nanos());
    assert_eq!(next.get("requests.acme").unwrap().value, PointValue::Long(0));
}

#[test]
#[serial]
fn reinjected_context_matches_incoming() {
    let config = with_vars([("OTEL_PROPAGATORS", None::<&str>)], load_config);
    let propagator = config.propagator();

    let cx = propagator.extract(&incoming("acme"));
    let mut outgoing = HeaderCarrier::new();
    propagator.inject_context(&cx, &mut outgoing);

    assert_eq!(outgoing.get("traceparent"), Some(TRACEPARENT));
    assert_eq!(outgoing.get("tracestate"), Some("congo=t61rcWkgMzE"));
    assert_eq!(
        outgoing.get("baggage"),
        Some("tenant=acme,userId=alice%40example.com")
    );

    let roundtrip = propagator.extract(&outgoing);
    assert_eq!(roundtrip, cx);
}

#[test]
fn context_converts_to_opentelemetry_span_context() {
    let span_context = SpanContext::new(
        TraceId::from_bytes([7; 16]),
        SpanId::from_bytes([9; 8]),
        TraceFlags::SAMPLED,
        TraceState::parse("vendor=value").unwrap(),
        true,
    );
    let cx = PropagationContext {
        span_context: span_context.clone(),
        baggage: Baggage::new(),
    };

    let otel: opentelemetry::trace::SpanContext = (&cx.span_context).into();
    assert!(otel.is_sampled());
    assert!(otel.is_remote());
    assert_eq!(otel.trace_state().get("vendor"), Some("value"));

    let back = SpanContext::from(&otel);
    assert_eq!(back, span_context);
}

#[tokio::test]
#[serial]
async fn collector_task_reports_latency_summaries() {
    let config = with_vars(
        [
            ("OTEL_METRIC_EXPORT_INTERVAL", Some("20")),
            ("OTEL_WIRE_COLLECTION__TEMPORALITY", Some("cumulative")),
        ],
        load_config,
    );
    assert_eq!(config.collection.interval, Duration::from_millis(20));
    assert_eq!(config.collection.temporality, Temporality::Cumulative);

    let mut collector = config.collector();
    let latency = collector.register(
        "latency.ms",
        Labels::new().with("route", "/checkout"),
        LongSummaryAggregator::default(),
    );
    let errors = collector.register(
        "errors",
        Labels::new(),
        AggregatorKind::Sum.create(InstrumentValueType::Long),
    );

    for ms in [12, 48, 7, 30] {
        latency.record_long(ms).unwrap();
    }
    errors.record_long(1).unwrap();
    assert!(errors.record_double(0.5).is_err());

    let shutdown = Arc::new(Notify::new());
    let (task, mut rx) = collector.spawn(Arc::clone(&shutdown));

    let first = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("batch before timeout")
        .expect("channel open");
    match &first.get("latency.ms").unwrap().value {
        PointValue::LongSummary(summary) => {
            assert_eq!(summary.count, 4);
            assert_eq!(summary.sum, 97);
            assert_eq!(summary.min, Some(7));
            assert_eq!(summary.max, Some(48));
        }
        other => panic!("unexpected value {other:?}"),
    }

    latency.record_long(100).unwrap();
    shutdown.notify_one();

    let mut last = first;
    while let Some(batch) = rx.recv().await {
        last = batch;
    }
    task.await.unwrap();

    match &last.get("latency.ms").unwrap().value {
        PointValue::LongSummary(summary) => {
            assert_eq!(summary.count, 5);
            assert_eq!(summary.max, Some(100));
        }
        other => panic!("unexpected value {other:?}"),
    }
    assert_eq!(last.get("errors").unwrap().value, PointValue::Long(1));
}

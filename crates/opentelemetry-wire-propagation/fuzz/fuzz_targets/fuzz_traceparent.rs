//! Fuzz target for the traceparent and tracestate decoders.
//!
//! Run with: `cargo +nightly fuzz run fuzz_traceparent`

#![no_main]

use libfuzzer_sys::fuzz_target;
use opentelemetry_wire_propagation::{TraceParent, TraceState};

fuzz_target!(|data: &str| {
    if let Ok(tp) = TraceParent::decode(data) {
        let encoded = tp.encode().expect("fixed layout always encodes");
        assert_eq!(TraceParent::decode(&encoded).map(|d| d.trace_id), Ok(tp.trace_id));
    }
    if let Ok(state) = TraceState::parse(data) {
        assert!(state.len() <= 32);
    }
});

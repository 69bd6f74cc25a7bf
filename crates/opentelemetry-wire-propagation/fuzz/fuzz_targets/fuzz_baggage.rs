//! Fuzz target for the baggage header parser and percent codec.
//!
//! Run with: `cargo +nightly fuzz run fuzz_baggage`

#![no_main]

use libfuzzer_sys::fuzz_target;
use opentelemetry_wire_propagation::{Baggage, BaggageLimits, percent};

fuzz_target!(|data: &str| {
    if let Ok(baggage) = Baggage::parse(data)
        && let Some(header) = baggage.to_header()
    {
        // Re-escaping can grow the header, so only the entry limit applies.
        let limits = BaggageLimits {
            max_header_bytes: usize::MAX,
            ..BaggageLimits::default()
        };
        assert_eq!(Baggage::parse_with_limits(&header, &limits).as_ref(), Ok(&baggage));
    }
    assert_eq!(percent::decode(&percent::escape(data)).as_deref(), Ok(data));
});

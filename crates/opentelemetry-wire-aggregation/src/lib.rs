//! Thread-safe numeric metric aggregators.
//!
//! Recording threads call `record_long`/`record_double` on a shared
//! aggregator; a single collector periodically drains it with
//! [`Aggregator::merge_to_and_reset`] and turns the drained state into a
//! [`Point`].
//!
//! # Aggregators
//!
//! | Kind | Long | Double | Empty window |
//! |------|------|--------|--------------|
//! | Sum | [`LongSumAggregator`] | [`DoubleSumAggregator`] | point with `0` |
//! | Last value | [`LongLastValueAggregator`] | [`DoubleLastValueAggregator`] | no point |
//! | Summary | [`LongSummaryAggregator`] | [`DoubleSummaryAggregator`] | point with count `0` |
//!
//! Sums and last values each live in a single 64-bit atomic word and never
//! block; summaries take a short reader-writer lock.
//!
//! # Usage
//!
//! ```
//! use opentelemetry_wire_aggregation::{
//!     Aggregator, Collector, Labels, LongSumAggregator, PointValue, now_epoch_nanos,
//! };
//!
//! let mut collector = Collector::with_defaults();
//! let requests = collector.register(
//!     "http.requests",
//!     Labels::new().with("route", "/users"),
//!     LongSumAggregator::default(),
//! );
//!
//! requests.record_long(1).unwrap();
//! requests.record_long(1).unwrap();
//!
//! let batch = collector.collect_once(now_epoch_nanos());
//! assert_eq!(batch.get("http.requests").unwrap().value, PointValue::Long(2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod error;
pub mod factory;
pub mod labels;
pub mod point;
pub mod stream;

pub use aggregator::{
    Aggregator, DoubleLastValueAggregator, DoubleSumAggregator, DoubleSummaryAggregator,
    LongLastValueAggregator, LongSumAggregator, LongSummaryAggregator, Number, Summary,
    SummaryAggregator,
};
pub use collector::{Collector, MIN_INTERVAL, MetricBatch, NamedPoint, now_epoch_nanos};
pub use config::CollectionConfig;
pub use error::{AggregationError, Result};
pub use factory::{AggregatorKind, AnyAggregator, InstrumentValueType};
pub use labels::Labels;
pub use point::{Point, PointValue};
pub use stream::{Collectable, MetricStream, Temporality};

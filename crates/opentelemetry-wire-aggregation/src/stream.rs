//! Named metric streams and their collection windows.

use crate::aggregator::Aggregator;
use crate::error::Result;
use crate::labels::Labels;
use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Time window covered by each collected point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temporality {
    /// Each point covers the time since the previous collection.
    #[default]
    Delta,
    /// Each point covers the time since the stream was created.
    Cumulative,
}

/// A stream that can be drained into a point.
///
/// Object-safe so a collector can hold streams of different aggregator types.
pub trait Collectable: Send + fmt::Debug {
    /// Metric name.
    fn name(&self) -> &str;

    /// Drains the live aggregator and returns the point for the window ending
    /// at `epoch_nanos`.
    fn collect(&mut self, epoch_nanos: u64) -> Result<Option<Point>>;
}

/// A named, labelled aggregator with a collection window.
///
/// Recorders get the live aggregator through [`handle`](Self::handle) and
/// record into it concurrently; only the stream drains it.
#[derive(Debug)]
pub struct MetricStream<A> {
    name: String,
    labels: Labels,
    live: Arc<A>,
    accumulated: A,
    temporality: Temporality,
    start_epoch_nanos: u64,
}

impl<A: Aggregator> MetricStream<A> {
    /// Creates a stream whose first window starts at `start_epoch_nanos`.
    pub fn new(
        name: impl Into<String>,
        labels: Labels,
        aggregator: A,
        temporality: Temporality,
        start_epoch_nanos: u64,
    ) -> Self {
        let accumulated = aggregator.empty();
        Self {
            name: name.into(),
            labels,
            live: Arc::new(aggregator),
            accumulated,
            temporality,
            start_epoch_nanos,
        }
    }

    /// Shared handle for recording measurements.
    pub fn handle(&self) -> Arc<A> {
        Arc::clone(&self.live)
    }

    /// Labels attached to every point.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Collection temporality.
    pub fn temporality(&self) -> Temporality {
        self.temporality
    }
}

impl<A: Aggregator> Collectable for MetricStream<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn collect(&mut self, epoch_nanos: u64) -> Result<Option<Point>> {
        match self.temporality {
            Temporality::Delta => {
                let window = self.live.empty();
                self.live.merge_to_and_reset(&window)?;
                let point = window.to_point(self.start_epoch_nanos, epoch_nanos, &self.labels);
                self.start_epoch_nanos = epoch_nanos;
                Ok(point)
            }
            Temporality::Cumulative => {
                self.live.merge_to_and_reset(&self.accumulated)?;
                Ok(self
                    .accumulated
                    .to_point(self.start_epoch_nanos, epoch_nanos, &self.labels))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{LongLastValueAggregator, LongSumAggregator, LongSummaryAggregator};
    use crate::point::PointValue;

    fn value(point: Option<Point>) -> PointValue {
        point.expect("point").value
    }

    #[test]
    fn test_delta_sum_windows() {
        let mut stream = MetricStream::new(
            "requests",
            Labels::new(),
            LongSumAggregator::default(),
            Temporality::Delta,
            100,
        );
        let handle = stream.handle();

        handle.record_long(3).unwrap();
        let first = stream.collect(200).unwrap().unwrap();
        assert_eq!((first.start_epoch_nanos, first.epoch_nanos), (100, 200));
        assert_eq!(first.value, PointValue::Long(3));

        handle.record_long(4).unwrap();
        let second = stream.collect(300).unwrap().unwrap();
        assert_eq!((second.start_epoch_nanos, second.epoch_nanos), (200, 300));
        assert_eq!(second.value, PointValue::Long(4));
    }

    #[test]
    fn test_cumulative_sum_accumulates() {
        let mut stream = MetricStream::new(
            "requests",
            Labels::new(),
            LongSumAggregator::default(),
            Temporality::Cumulative,
            100,
        );
        let handle = stream.handle();

        handle.record_long(3).unwrap();
        assert_eq!(value(stream.collect(200).unwrap()), PointValue::Long(3));

        handle.record_long(4).unwrap();
        let point = stream.collect(300).unwrap().unwrap();
        assert_eq!((point.start_epoch_nanos, point.epoch_nanos), (100, 300));
        assert_eq!(point.value, PointValue::Long(7));
    }

    #[test]
    fn test_last_value_windows() {
        let mut delta = MetricStream::new(
            "temp",
            Labels::new(),
            LongLastValueAggregator::default(),
            Temporality::Delta,
            0,
        );
        delta.handle().record_long(5).unwrap();
        assert_eq!(value(delta.collect(1).unwrap()), PointValue::Long(5));
        assert!(delta.collect(2).unwrap().is_none());

        let mut cumulative = MetricStream::new(
            "temp",
            Labels::new(),
            LongLastValueAggregator::default(),
            Temporality::Cumulative,
            0,
        );
        cumulative.handle().record_long(5).unwrap();
        assert_eq!(value(cumulative.collect(1).unwrap()), PointValue::Long(5));
        assert!(cumulative.collect(2).unwrap().is_none());

        cumulative.handle().record_long(8).unwrap();
        assert_eq!(value(cumulative.collect(3).unwrap()), PointValue::Long(8));
    }

    #[test]
    fn test_cumulative_summary_combines() {
        let mut stream = MetricStream::new(
            "latency",
            Labels::new().with("route", "/"),
            LongSummaryAggregator::default(),
            Temporality::Cumulative,
            0,
        );
        let handle = stream.handle();
        handle.record_long(10).unwrap();
        stream.collect(1).unwrap();
        handle.record_long(2).unwrap();

        let point = stream.collect(2).unwrap().unwrap();
        assert_eq!(point.labels.get("route"), Some("/"));
        match point.value {
            PointValue::LongSummary(summary) => {
                assert_eq!(summary.count, 2);
                assert_eq!(summary.sum, 12);
                assert_eq!(summary.min, Some(2));
                assert_eq!(summary.max, Some(10));
            }
            other => panic!("unexpected value {other:?}"),
        }
    }
}

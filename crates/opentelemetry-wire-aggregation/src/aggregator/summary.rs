use super::Aggregator;
use crate::error::Result;
use crate::labels::Labels;
use crate::point::{Point, PointValue};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;

/// Numeric types a [`SummaryAggregator`] can accumulate.
pub trait Number: Copy + Default + PartialOrd + Send + Sync + fmt::Debug + 'static {
    /// Adds `rhs`; integer overflow wraps.
    fn add_wrapping(self, rhs: Self) -> Self;
}

impl Number for i64 {
    fn add_wrapping(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

impl Number for f64 {
    fn add_wrapping(self, rhs: Self) -> Self {
        self + rhs
    }
}

/// Count, sum, min and max of a set of measurements.
///
/// `min` and `max` are `None` until the first measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary<N> {
    /// Number of measurements.
    pub count: u64,
    /// Sum of measurements.
    pub sum: N,
    /// Smallest measurement.
    pub min: Option<N>,
    /// Largest measurement.
    pub max: Option<N>,
}

impl<N: Number> Summary<N> {
    /// Adds one measurement.
    pub fn record(&mut self, value: N) {
        self.count += 1;
        self.sum = self.sum.add_wrapping(value);
        self.min = Some(match self.min {
            Some(min) if min <= value => min,
            _ => value,
        });
        self.max = Some(match self.max {
            Some(max) if max >= value => max,
            _ => value,
        });
    }

    /// Combines `other` into this summary.
    pub fn update(&mut self, other: &Summary<N>) {
        self.count += other.count;
        self.sum = self.sum.add_wrapping(other.sum);
        self.min = pick(self.min, other.min, |a, b| b < a);
        self.max = pick(self.max, other.max, |a, b| b > a);
    }
}

fn pick<N: Copy>(current: Option<N>, incoming: Option<N>, better: fn(N, N) -> bool) -> Option<N> {
    match (current, incoming) {
        (Some(a), Some(b)) if better(a, b) => Some(b),
        (None, b) => b,
        (a, _) => a,
    }
}

/// Tracks a [`Summary`] behind a reader-writer lock.
#[derive(Debug, Default)]
pub struct SummaryAggregator<N> {
    state: RwLock<Summary<N>>,
}

/// Summary of integer measurements.
pub type LongSummaryAggregator = SummaryAggregator<i64>;

/// Summary of floating-point measurements.
pub type DoubleSummaryAggregator = SummaryAggregator<f64>;

impl<N: Number> SummaryAggregator<N> {
    /// Adds one measurement.
    pub fn record(&self, value: N) {
        self.state.write().record(value);
    }

    /// Returns the accumulated summary and resets to empty.
    pub fn copy_and_reset(&self) -> Summary<N> {
        std::mem::take(&mut *self.state.write())
    }

    /// Combines `other` into the accumulated summary.
    pub fn update(&self, other: &Summary<N>) {
        self.state.write().update(other);
    }

    /// Copy of the accumulated summary.
    pub fn snapshot(&self) -> Summary<N> {
        *self.state.read()
    }

    fn drain_into(&self, target: &Self) {
        let drained = self.copy_and_reset();
        target.update(&drained);
    }

    fn point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
        wrap: fn(Summary<N>) -> PointValue,
    ) -> Point {
        Point {
            start_epoch_nanos,
            epoch_nanos,
            labels: labels.clone(),
            value: wrap(self.snapshot()),
        }
    }
}

impl Aggregator for LongSummaryAggregator {
    fn name(&self) -> &'static str {
        "LongSummaryAggregator"
    }

    fn record_long(&self, value: i64) -> Result<()> {
        self.record(value);
        Ok(())
    }

    fn empty(&self) -> Self {
        Self::default()
    }

    fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
        self.drain_into(target);
        Ok(())
    }

    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point> {
        Some(self.point(start_epoch_nanos, epoch_nanos, labels, PointValue::LongSummary))
    }
}

impl Aggregator for DoubleSummaryAggregator {
    fn name(&self) -> &'static str {
        "DoubleSummaryAggregator"
    }

    fn record_double(&self, value: f64) -> Result<()> {
        self.record(value);
        Ok(())
    }

    fn empty(&self) -> Self {
        Self::default()
    }

    fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
        self.drain_into(target);
        Ok(())
    }

    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point> {
        Some(self.point(start_epoch_nanos, epoch_nanos, labels, PointValue::DoubleSummary))
    }
}

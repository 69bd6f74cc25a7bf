//! Thread-safe numeric aggregators.
//!
//! Every aggregator accepts concurrent `record_*` calls from any number of
//! threads through a shared reference. A single collector periodically calls
//! [`Aggregator::merge_to_and_reset`] to drain the accumulated state into a
//! target and turns the target into a [`Point`].
//!
//! A measurement that races with a merge lands either in the drained state
//! or in the next window, never in both and never nowhere.

mod last_value;
mod sum;
mod summary;

pub use last_value::{DoubleLastValueAggregator, LongLastValueAggregator};
pub use sum::{DoubleSumAggregator, LongSumAggregator};
pub use summary::{
    DoubleSummaryAggregator, LongSummaryAggregator, Number, Summary, SummaryAggregator,
};

use crate::error::{AggregationError, Result};
use crate::labels::Labels;
use crate::point::Point;
use std::fmt;

/// Accumulates measurements between collections.
pub trait Aggregator: Send + Sync + fmt::Debug {
    /// Type name used in error messages.
    fn name(&self) -> &'static str;

    /// Records an integer measurement.
    fn record_long(&self, _value: i64) -> Result<()> {
        Err(AggregationError::unsupported(self.name(), "record_long"))
    }

    /// Records a floating-point measurement.
    fn record_double(&self, _value: f64) -> Result<()> {
        Err(AggregationError::unsupported(self.name(), "record_double"))
    }

    /// Returns a new aggregator of the same shape in its identity state.
    fn empty(&self) -> Self;

    /// Drains this aggregator into `target` and resets it.
    fn merge_to_and_reset(&self, target: &Self) -> Result<()>;

    /// Snapshots the current state, or `None` if there is nothing to report.
    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_unsupported() {
        let agg = LongSumAggregator::default();
        let err = agg.record_double(1.0).unwrap_err();
        assert_eq!(
            err,
            AggregationError::UnsupportedOperation {
                aggregator: "LongSumAggregator",
                operation: "record_double",
            }
        );

        let agg = DoubleLastValueAggregator::default();
        assert!(agg.record_long(1).is_err());
    }
}

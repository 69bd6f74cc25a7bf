//! Aggregator selection by kind and value type.

use crate::aggregator::{
    Aggregator, DoubleLastValueAggregator, DoubleSumAggregator, DoubleSummaryAggregator,
    LongLastValueAggregator, LongSumAggregator, LongSummaryAggregator,
};
use crate::error::{AggregationError, Result};
use crate::labels::Labels;
use crate::point::Point;
use serde::{Deserialize, Serialize};

/// How measurements are combined.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorKind {
    /// Running total.
    Sum,
    /// Most recent measurement.
    LastValue,
    /// Count, sum, min and max.
    Summary,
}

/// Numeric type of an instrument's measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentValueType {
    /// `i64` measurements.
    Long,
    /// `f64` measurements.
    Double,
}

impl AggregatorKind {
    /// Creates an empty aggregator of this kind for `value_type`.
    ///
    /// # Examples
    ///
    /// ```
    /// use opentelemetry_wire_aggregation::{Aggregator, AggregatorKind, InstrumentValueType};
    ///
    /// let agg = AggregatorKind::Sum.create(InstrumentValueType::Long);
    /// agg.record_long(3).unwrap();
    /// assert!(agg.record_double(1.0).is_err());
    /// ```
    pub fn create(self, value_type: InstrumentValueType) -> AnyAggregator {
        use InstrumentValueType::{Double, Long};

        match (self, value_type) {
            (Self::Sum, Long) => AnyAggregator::LongSum(LongSumAggregator::default()),
            (Self::Sum, Double) => AnyAggregator::DoubleSum(DoubleSumAggregator::default()),
            (Self::LastValue, Long) => {
                AnyAggregator::LongLastValue(LongLastValueAggregator::default())
            }
            (Self::LastValue, Double) => {
                AnyAggregator::DoubleLastValue(DoubleLastValueAggregator::default())
            }
            (Self::Summary, Long) => AnyAggregator::LongSummary(LongSummaryAggregator::default()),
            (Self::Summary, Double) => {
                AnyAggregator::DoubleSummary(DoubleSummaryAggregator::default())
            }
        }
    }
}

/// Any concrete aggregator, chosen at runtime.
#[derive(Debug)]
pub enum AnyAggregator {
    /// See [`LongSumAggregator`].
    LongSum(LongSumAggregator),
    /// See [`DoubleSumAggregator`].
    DoubleSum(DoubleSumAggregator),
    /// See [`LongLastValueAggregator`].
    LongLastValue(LongLastValueAggregator),
    /// See [`DoubleLastValueAggregator`].
    DoubleLastValue(DoubleLastValueAggregator),
    /// See [`LongSummaryAggregator`].
    LongSummary(LongSummaryAggregator),
    /// See [`DoubleSummaryAggregator`].
    DoubleSummary(DoubleSummaryAggregator),
}

macro_rules! delegate {
    ($self:expr, $agg:ident => $body:expr) => {
        match $self {
            AnyAggregator::LongSum($agg) => $body,
            AnyAggregator::DoubleSum($agg) => $body,
            AnyAggregator::LongLastValue($agg) => $body,
            AnyAggregator::DoubleLastValue($agg) => $body,
            AnyAggregator::LongSummary($agg) => $body,
            AnyAggregator::DoubleSummary($agg) => $body,
        }
    };
}

impl Aggregator for AnyAggregator {
    fn name(&self) -> &'static str {
        delegate!(self, agg => agg.name())
    }

    fn record_long(&self, value: i64) -> Result<()> {
        delegate!(self, agg => agg.record_long(value))
    }

    fn record_double(&self, value: f64) -> Result<()> {
        delegate!(self, agg => agg.record_double(value))
    }

    fn empty(&self) -> Self {
        match self {
            Self::LongSum(agg) => Self::LongSum(agg.empty()),
            Self::DoubleSum(agg) => Self::DoubleSum(agg.empty()),
            Self::LongLastValue(agg) => Self::LongLastValue(agg.empty()),
            Self::DoubleLastValue(agg) => Self::DoubleLastValue(agg.empty()),
            Self::LongSummary(agg) => Self::LongSummary(agg.empty()),
            Self::DoubleSummary(agg) => Self::DoubleSummary(agg.empty()),
        }
    }

    fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
        match (self, target) {
            (Self::LongSum(a), Self::LongSum(b)) => a.merge_to_and_reset(b),
            (Self::DoubleSum(a), Self::DoubleSum(b)) => a.merge_to_and_reset(b),
            (Self::LongLastValue(a), Self::LongLastValue(b)) => a.merge_to_and_reset(b),
            (Self::DoubleLastValue(a), Self::DoubleLastValue(b)) => a.merge_to_and_reset(b),
            (Self::LongSummary(a), Self::LongSummary(b)) => a.merge_to_and_reset(b),
            (Self::DoubleSummary(a), Self::DoubleSummary(b)) => a.merge_to_and_reset(b),
            _ => Err(AggregationError::IncompatibleMerge {
                from: self.name(),
                into: target.name(),
            }),
        }
    }

    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point> {
        delegate!(self, agg => agg.to_point(start_epoch_nanos, epoch_nanos, labels))
    }
}

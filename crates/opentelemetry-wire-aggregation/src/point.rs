//! Immutable snapshots produced by a collection cycle.

use crate::aggregator::Summary;
use crate::labels::Labels;
use serde::Serialize;

/// One aggregated value over a time window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    /// Window start, nanoseconds since the Unix epoch.
    pub start_epoch_nanos: u64,
    /// Window end, nanoseconds since the Unix epoch.
    pub epoch_nanos: u64,
    /// Labels of the stream the point came from.
    pub labels: Labels,
    /// The aggregated value.
    pub value: PointValue,
}

/// The value carried by a [`Point`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PointValue {
    /// Integer sum or last value.
    Long(i64),
    /// Floating-point sum or last value.
    Double(f64),
    /// Integer count, sum, min and max.
    LongSummary(Summary<i64>),
    /// Floating-point count, sum, min and max.
    DoubleSummary(Summary<f64>),
}

impl PointValue {
    /// Returns the integer value of a `Long` point.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the floating-point value of a `Double` point.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }
}

//! Error types for metric aggregation.

use thiserror::Error;

/// A specialised Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;

/// Errors returned by aggregators.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// The aggregator does not accept this kind of measurement.
    #[error("{aggregator} does not support {operation}")]
    UnsupportedOperation {
        /// Aggregator type name.
        aggregator: &'static str,
        /// Rejected operation.
        operation: &'static str,
    },

    /// Two aggregators of different shapes were merged.
    #[error("cannot merge {from} into {into}")]
    IncompatibleMerge {
        /// Aggregator being drained.
        from: &'static str,
        /// Merge target.
        into: &'static str,
    },
}

impl AggregationError {
    pub(crate) fn unsupported(aggregator: &'static str, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            aggregator,
            operation,
        }
    }
}

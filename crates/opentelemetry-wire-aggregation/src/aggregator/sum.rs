use super::Aggregator;
use crate::error::Result;
use crate::labels::Labels;
use crate::point::{Point, PointValue};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Running integer sum.
///
/// Overflow wraps.
#[derive(Debug, Default)]
pub struct LongSumAggregator {
    current: AtomicI64,
}

impl LongSumAggregator {
    /// Current sum.
    pub fn value(&self) -> i64 {
        self.current.load(Ordering::Acquire)
    }
}

impl Aggregator for LongSumAggregator {
    fn name(&self) -> &'static str {
        "LongSumAggregator"
    }

    fn record_long(&self, value: i64) -> Result<()> {
        self.current.fetch_add(value, Ordering::AcqRel);
        Ok(())
    }

    fn empty(&self) -> Self {
        Self::default()
    }

    fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
        let drained = self.current.swap(0, Ordering::AcqRel);
        target.current.fetch_add(drained, Ordering::AcqRel);
        Ok(())
    }

    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point> {
        Some(Point {
            start_epoch_nanos,
            epoch_nanos,
            labels: labels.clone(),
            value: PointValue::Long(self.value()),
        })
    }
}

/// Running floating-point sum.
///
/// The value is stored as its IEEE-754 bit pattern so additions can be done
/// with a compare-and-swap loop.
#[derive(Debug, Default)]
pub struct DoubleSumAggregator {
    bits: AtomicU64,
}

impl DoubleSumAggregator {
    /// Current sum.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn add(&self, delta: f64) {
        // The closure never returns None, so the update cannot fail.
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            });
    }
}

impl Aggregator for DoubleSumAggregator {
    fn name(&self) -> &'static str {
        "DoubleSumAggregator"
    }

    fn record_double(&self, value: f64) -> Result<()> {
        self.add(value);
        Ok(())
    }

    fn empty(&self) -> Self {
        Self::default()
    }

    fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
        let drained = f64::from_bits(self.bits.swap(0.0f64.to_bits(), Ordering::AcqRel));
        target.add(drained);
        Ok(())
    }

    fn to_point(
        &self,
        start_epoch_nanos: u64,
        epoch_nanos: u64,
        labels: &Labels,
    ) -> Option<Point> {
        Some(Point {
            start_epoch_nanos,
            epoch_nanos,
            labels: labels.clone(),
            value: PointValue::Double(self.value()),
        })
    }
}

use super::Aggregator;
use crate::error::Result;
use crate::labels::Labels;
use crate::point::{Point, PointValue};
use crossbeam_utils::atomic::AtomicCell;
use std::fmt;
use std::marker::PhantomData;

/// A value that packs into 64 bits with one bit pattern reserved for "unset".
trait Slotted: Copy {
    const EMPTY: u64;

    fn encode(self) -> u64;
    fn decode(bits: u64) -> Self;
}

impl Slotted for i64 {
    const EMPTY: u64 = i64::MIN as u64;

    // i64::MIN is reserved and records as i64::MIN + 1.
    fn encode(self) -> u64 {
        self.max(i64::MIN + 1) as u64
    }

    fn decode(bits: u64) -> Self {
        bits as i64
    }
}

impl Slotted for f64 {
    // Quiet NaN with a payload no arithmetic produces.
    const EMPTY: u64 = 0x7ff8_dead_beef_0001;

    fn encode(self) -> u64 {
        let bits = self.to_bits();
        if bits == Self::EMPTY {
            f64::NAN.to_bits()
        } else {
            bits
        }
    }

    fn decode(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

/// Single-word optional value. Every operation is one atomic instruction.
struct Slot<T> {
    bits: AtomicCell<u64>,
    _value: PhantomData<T>,
}

impl<T: Slotted> Slot<T> {
    fn unpack(bits: u64) -> Option<T> {
        (bits != T::EMPTY).then(|| T::decode(bits))
    }

    fn load(&self) -> Option<T> {
        Self::unpack(self.bits.load())
    }

    fn store(&self, value: Option<T>) {
        self.bits.store(value.map_or(T::EMPTY, T::encode));
    }

    fn take(&self) -> Option<T> {
        Self::unpack(self.bits.swap(T::EMPTY))
    }
}

impl<T: Slotted> Default for Slot<T> {
    fn default() -> Self {
        Self {
            bits: AtomicCell::new(T::EMPTY),
            _value: PhantomData,
        }
    }
}

impl<T: Slotted + fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

macro_rules! last_value_aggregator {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $record:ident, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            current: Slot<$ty>,
        }

        impl $name {
            /// Most recently recorded value.
            pub fn value(&self) -> Option<$ty> {
                self.current.load()
            }
        }

        impl Aggregator for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn $record(&self, value: $ty) -> Result<()> {
                self.current.store(Some(value));
                Ok(())
            }

            fn empty(&self) -> Self {
                Self::default()
            }

            fn merge_to_and_reset(&self, target: &Self) -> Result<()> {
                target.current.store(self.current.take());
                Ok(())
            }

            fn to_point(
                &self,
                start_epoch_nanos: u64,
                epoch_nanos: u64,
                labels: &Labels,
            ) -> Option<Point> {
                self.current.load().map(|value| Point {
                    start_epoch_nanos,
                    epoch_nanos,
                    labels: labels.clone(),
                    value: PointValue::$variant(value),
                })
            }
        }
    };
}

last_value_aggregator!(
    /// Keeps the most recent integer measurement.
    ///
    /// `i64::MIN` is reserved as the unset marker and records as
    /// `i64::MIN + 1`.
    LongLastValueAggregator,
    i64,
    record_long,
    Long
);

last_value_aggregator!(
    /// Keeps the most recent floating-point measurement.
    DoubleLastValueAggregator,
    f64,
    record_double,
    Double
);

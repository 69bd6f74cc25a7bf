//! Collection settings.
//!
//! This struct forms the `[collection]` section of the layered configuration.

use crate::stream::Temporality;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often and in what form metric streams are collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Time between collections in milliseconds.
    #[serde(with = "duration_ms")]
    pub interval: Duration,
    /// Whether points report the last window or everything since start.
    pub temporality: Temporality,
    /// Batches buffered between the collector and its consumer.
    pub channel_capacity: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            temporality: Temporality::Delta,
            channel_capacity: 16,
        }
    }
}

/// Serde support for durations expressed as whole milliseconds.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Writes `duration` as milliseconds.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Reads milliseconds into a [`Duration`].
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}

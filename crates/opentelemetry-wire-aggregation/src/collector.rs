//! Periodic collection of metric streams.
//!
//! The [`Collector`] owns every registered stream, so exactly one task ever
//! drains a given aggregator. Recorders only hold the `Arc` handle returned
//! by [`Collector::register`].

use crate::aggregator::Aggregator;
use crate::config::CollectionConfig;
use crate::labels::Labels;
use crate::point::Point;
use crate::stream::{Collectable, MetricStream};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest collection interval [`Collector::run`] will tick at.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A point tagged with its metric name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedPoint {
    /// Metric name.
    pub name: String,
    /// The collected point.
    pub point: Point,
}

/// Points produced by one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBatch {
    /// When the collection ran, nanoseconds since the Unix epoch.
    pub epoch_nanos: u64,
    /// One entry per stream that had something to report.
    pub points: Vec<NamedPoint>,
}

impl MetricBatch {
    /// Returns `true` if no stream reported a point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns the first point for `name`.
    pub fn get(&self, name: &str) -> Option<&Point> {
        self.points.iter().find(|p| p.name == name).map(|p| &p.point)
    }
}

/// Owns metric streams and drains them on a timer.
#[derive(Debug)]
pub struct Collector {
    streams: Vec<Box<dyn Collectable>>,
    config: CollectionConfig,
}

impl Collector {
    /// Creates a collector with no streams.
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            streams: Vec::new(),
            config,
        }
    }

    /// Creates a collector with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CollectionConfig::default())
    }

    /// Registers `aggregator` under `name` and returns its recording handle.
    ///
    /// The stream uses the configured temporality and starts its first window
    /// now.
    pub fn register<A: Aggregator + 'static>(
        &mut self,
        name: impl Into<String>,
        labels: Labels,
        aggregator: A,
    ) -> Arc<A> {
        let stream = MetricStream::new(
            name,
            labels,
            aggregator,
            self.config.temporality,
            now_epoch_nanos(),
        );
        let handle = stream.handle();
        self.register_stream(stream);
        handle
    }

    /// Adds an already constructed stream.
    pub fn register_stream(&mut self, stream: impl Collectable + 'static) {
        tracing::debug!(name = stream.name(), "Registered metric stream");
        self.streams.push(Box::new(stream));
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Returns `true` if no streams are registered.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Collection settings.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Drains every stream once, for the window ending at `epoch_nanos`.
    ///
    /// A stream that fails to collect is logged and left out of the batch.
    pub fn collect_once(&mut self, epoch_nanos: u64) -> MetricBatch {
        let mut points = Vec::with_capacity(self.streams.len());

        for stream in &mut self.streams {
            match stream.collect(epoch_nanos) {
                Ok(Some(point)) => points.push(NamedPoint {
                    name: stream.name().to_string(),
                    point,
                }),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        name = stream.name(),
                        error = %e,
                        "Failed to collect metric stream"
                    );
                }
            }
        }

        MetricBatch {
            epoch_nanos,
            points,
        }
    }

    /// Collects on every interval tick and sends non-empty batches to `tx`.
    ///
    /// When `shutdown` is notified a final collection is sent before
    /// returning. The loop also ends if the receiver is dropped. Intervals
    /// shorter than [`MIN_INTERVAL`] are raised to it.
    pub async fn run(mut self, tx: mpsc::Sender<MetricBatch>, shutdown: Arc<Notify>) {
        let interval = self.config.interval.max(MIN_INTERVAL);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::info!(
            streams = self.streams.len(),
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Metric collector started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let batch = self.collect_once(now_epoch_nanos());
                    if batch.is_empty() {
                        continue;
                    }
                    tracing::debug!(points = batch.len(), "Collected metric batch");
                    if tx.send(batch).await.is_err() {
                        tracing::debug!("Metric batch receiver dropped");
                        return;
                    }
                }
                _ = shutdown.notified() => {
                    let batch = self.collect_once(now_epoch_nanos());
                    if !batch.is_empty() && tx.send(batch).await.is_err() {
                        tracing::debug!("Metric batch receiver dropped before final flush");
                    }
                    tracing::info!("Metric collector stopped");
                    return;
                }
            }
        }
    }

    /// Spawns [`run`](Self::run) on the current runtime.
    ///
    /// Returns the task handle and the receiving end of a channel sized by
    /// `channel_capacity`.
    pub fn spawn(self, shutdown: Arc<Notify>) -> (JoinHandle<()>, mpsc::Receiver<MetricBatch>) {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let handle = tokio::spawn(self.run(tx, shutdown));
        (handle, rx)
    }
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
pub fn now_epoch_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

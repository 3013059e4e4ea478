//! In-memory per-item price series with retention and aggregation.
//!
//! Series are created implicitly on first record. Retention is enforced
//! at query time: points older than `now - retention` are excluded from
//! range and aggregate results, while physical eviction stays lazy (the
//! contract is exclusion, not deletion timing).

use crate::backend::SeriesBackend;
use crate::error::SeriesResult;
use crate::series::{AggregateOp, PricePoint, SeriesError};
use crate::types::{ItemKey, TimestampMs};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Append-only price series keyed by normalized item name.
#[derive(Debug)]
pub struct InMemorySeriesStore {
    retention_ms: u64,
    inner: RwLock<HashMap<ItemKey, Vec<PricePoint>>>,
}

impl InMemorySeriesStore {
    /// Creates a store with the given retention window.
    ///
    /// Retention is per-store and fixed at configuration time.
    pub fn new(retention: Duration) -> SeriesResult<Self> {
        let retention_ms = retention.as_millis() as u64;
        if retention_ms == 0 {
            return Err(SeriesError::ZeroRetention);
        }
        Ok(Self {
            retention_ms,
            inner: RwLock::new(HashMap::new()),
        })
    }

    /// Number of series that have received at least one point.
    #[must_use]
    pub fn series_count(&self) -> usize {
        self.inner.read().len()
    }

    /// The configured retention window.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms)
    }
}

impl SeriesBackend for InMemorySeriesStore {
    fn record(&self, key: &ItemKey, timestamp: TimestampMs, price: f64, store: &str) {
        let mut inner = self.inner.write();
        let series = inner.entry(key.clone()).or_default();
        let point = PricePoint {
            timestamp,
            price,
            store: store.to_string(),
        };
        // Keep the series sorted by timestamp; equal timestamps keep
        // arrival order.
        let pos = series.partition_point(|p| p.timestamp <= timestamp);
        series.insert(pos, point);
        debug!(key = %key, price, store, "recorded price point");
    }

    fn range_at(
        &self,
        key: &ItemKey,
        from: TimestampMs,
        to: TimestampMs,
        now: TimestampMs,
    ) -> Vec<PricePoint> {
        let horizon = now.saturating_sub(self.retention_ms);
        let inner = self.inner.read();
        let Some(series) = inner.get(key) else {
            // Never-created series: empty result, not an error
            return Vec::new();
        };
        series
            .iter()
            .filter(|p| p.timestamp >= from && p.timestamp <= to && p.timestamp >= horizon)
            .cloned()
            .collect()
    }

    fn aggregate_at(
        &self,
        key: &ItemKey,
        from: TimestampMs,
        to: TimestampMs,
        op: AggregateOp,
        now: TimestampMs,
    ) -> Option<f64> {
        let points = self.range_at(key, from, to, now);
        if points.is_empty() {
            return None;
        }
        let value = match op {
            AggregateOp::Min => points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min),
            AggregateOp::Max => points
                .iter()
                .map(|p| p.price)
                .fold(f64::NEG_INFINITY, f64::max),
            AggregateOp::Avg => {
                points.iter().map(|p| p.price).sum::<f64>() / points.len() as f64
            }
        };
        Some(value)
    }
}

//! Backend capability handles for the index and series stores.
//!
//! The core never reaches for a hidden global connection. An explicit
//! initialization step probes the backend once at startup and returns a
//! capability-typed [`BackendHandle`] that is either `Connected` (full
//! in-memory backends) or `Degraded` (no-op backends that answer every
//! query with empty/absent results). Callers treat "no similar items"
//! and "backend down" identically at this layer: degraded, not crashed.

use crate::config::Settings;
use crate::error::VectorResult;
use crate::series::{AggregateOp, InMemorySeriesStore, PricePoint};
use crate::types::{ItemId, ItemKey, ItemMeta, TimestampMs};
use crate::vector::{InMemoryVectorIndex, ScoredMatch, VectorDimension};
use std::sync::Arc;
use tracing::{info, warn};

/// Capability interface of the vector index backend.
pub trait VectorBackend: Send + Sync {
    /// Inserts or replaces the entry for `id`. Overwrite is not an error.
    fn upsert(&self, id: ItemId, vector: Vec<f32>, meta: ItemMeta) -> VectorResult<()>;

    /// Removes the entry; no-op if absent.
    fn remove(&self, id: &ItemId);

    /// Up to `k` entries ranked by descending cosine similarity.
    ///
    /// Never fails: an unavailable or empty backend yields an empty
    /// sequence.
    fn knn(&self, query: &[f32], k: usize) -> Vec<ScoredMatch>;
}

/// Capability interface of the time-series backend.
pub trait SeriesBackend: Send + Sync {
    /// Appends a point, creating the series on first use.
    fn record(&self, key: &ItemKey, timestamp: TimestampMs, price: f64, store: &str);

    /// Points in `[from, to]` ascending by timestamp, retention-filtered
    /// against the supplied `now`.
    fn range_at(
        &self,
        key: &ItemKey,
        from: TimestampMs,
        to: TimestampMs,
        now: TimestampMs,
    ) -> Vec<PricePoint>;

    /// Single-bucket aggregate over `[from, to]`, or `None` when no
    /// points are in range.
    fn aggregate_at(
        &self,
        key: &ItemKey,
        from: TimestampMs,
        to: TimestampMs,
        op: AggregateOp,
        now: TimestampMs,
    ) -> Option<f64>;

    /// [`Self::range_at`] against the system clock.
    fn range(&self, key: &ItemKey, from: TimestampMs, to: TimestampMs) -> Vec<PricePoint> {
        self.range_at(key, from, to, TimestampMs::now())
    }

    /// [`Self::aggregate_at`] against the system clock.
    fn aggregate(
        &self,
        key: &ItemKey,
        from: TimestampMs,
        to: TimestampMs,
        op: AggregateOp,
    ) -> Option<f64> {
        self.aggregate_at(key, from, to, op, TimestampMs::now())
    }
}

/// Whether the handle is backed by real storage or by no-op fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Connected,
    Degraded,
}

/// Capability-typed handle to the two storage backends.
///
/// Constructed once at startup and passed by reference to whatever owns
/// the ingestion and comparison paths.
#[derive(Clone)]
pub struct BackendHandle {
    state: BackendState,
    vector: Arc<dyn VectorBackend>,
    series: Arc<dyn SeriesBackend>,
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BackendHandle {
    /// Probes and initializes the backends described by `settings`.
    ///
    /// Falls back to the degraded handle instead of failing: backend
    /// unavailability must never be fatal to the enclosing process.
    pub fn connect(settings: &Settings) -> Self {
        match Self::try_connect(settings) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("backend unavailable, continuing degraded: {e}");
                Self::degraded()
            }
        }
    }

    fn try_connect(settings: &Settings) -> Result<Self, Box<dyn std::error::Error>> {
        let dimension = VectorDimension::new(settings.embedding.dimension)?;
        let index = InMemoryVectorIndex::new(dimension);
        let series = InMemorySeriesStore::new(settings.timeseries.retention())?;
        info!(
            dimension = dimension.get(),
            retention_hours = settings.timeseries.retention_hours,
            "price backend connected"
        );
        Ok(Self {
            state: BackendState::Connected,
            vector: Arc::new(index),
            series: Arc::new(series),
        })
    }

    /// A handle whose backends drop writes and answer every query with
    /// empty/absent results.
    #[must_use]
    pub fn degraded() -> Self {
        Self {
            state: BackendState::Degraded,
            vector: Arc::new(DegradedVectorBackend),
            series: Arc::new(DegradedSeriesBackend),
        }
    }

    /// Builds a handle around caller-supplied backends.
    #[must_use]
    pub fn with_backends(
        vector: Arc<dyn VectorBackend>,
        series: Arc<dyn SeriesBackend>,
    ) -> Self {
        Self {
            state: BackendState::Connected,
            vector,
            series,
        }
    }

    #[must_use]
    pub fn state(&self) -> BackendState {
        self.state
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.state == BackendState::Degraded
    }

    #[must_use]
    pub fn vector(&self) -> &dyn VectorBackend {
        self.vector.as_ref()
    }

    #[must_use]
    pub fn series(&self) -> &dyn SeriesBackend {
        self.series.as_ref()
    }
}

/// No-op vector backend used when the real one is unreachable.
struct DegradedVectorBackend;

impl VectorBackend for DegradedVectorBackend {
    fn upsert(&self, _id: ItemId, _vector: Vec<f32>, _meta: ItemMeta) -> VectorResult<()> {
        Ok(())
    }

    fn remove(&self, _id: &ItemId) {}

    fn knn(&self, _query: &[f32], _k: usize) -> Vec<ScoredMatch> {
        Vec::new()
    }
}

/// No-op series backend used when the real one is unreachable.
struct DegradedSeriesBackend;

impl SeriesBackend for DegradedSeriesBackend {
    fn record(&self, _key: &ItemKey, _timestamp: TimestampMs, _price: f64, _store: &str) {}

    fn range_at(
        &self,
        _key: &ItemKey,
        _from: TimestampMs,
        _to: TimestampMs,
        _now: TimestampMs,
    ) -> Vec<PricePoint> {
        Vec::new()
    }

    fn aggregate_at(
        &self,
        _key: &ItemKey,
        _from: TimestampMs,
        _to: TimestampMs,
        _op: AggregateOp,
        _now: TimestampMs,
    ) -> Option<f64> {
        None
    }
}

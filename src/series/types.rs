//! Core types for the price time-series store.

use crate::types::TimestampMs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One price observation on a series.
///
/// Points are append-only and never edited; deleting the originating
/// item does not retroactively remove its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: TimestampMs,
    pub price: f64,
    /// Store name carried along as a label for trend rendering.
    pub store: String,
}

/// Aggregation operator for a range of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Min,
    Max,
    Avg,
}

/// Min/max/avg aggregates over one query window.
///
/// `None` fields mean no points existed in range, an absence signal
/// distinct from a zero price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

impl WindowStats {
    /// True when all three aggregates are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.min.is_some() && self.max.is_some() && self.avg.is_some()
    }
}

/// Errors that can occur when constructing a series store.
#[derive(Error, Debug)]
pub enum SeriesError {
    #[error(
        "Retention window cannot be zero\nSuggestion: Configure timeseries.retention_hours to a positive value"
    )]
    ZeroRetention,
}

//! Per-item price time series.
//!
//! Each normalized item name owns an append-only, time-ordered series of
//! price observations. Queries answer ranges and single-bucket min/max/avg
//! aggregates, with a fixed retention window excluding stale points.

mod store;
mod types;

pub use store::InMemorySeriesStore;
pub use types::{AggregateOp, PricePoint, SeriesError, WindowStats};

//! Grocery price intelligence core.
//!
//! Given free-text item names from receipts, this crate finds "the same
//! item" across stores via a cheap deterministic embedding index, tracks
//! price observations over time, and turns the combined data into ranked
//! buying recommendations.
//!
//! The crate is transport-agnostic: ingestion and comparison are plain
//! function calls on [`PriceIntelligence`], and the surrounding system is
//! expected to own persistence, HTTP, and receipt parsing.

pub mod backend;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod recommend;
pub mod series;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use backend::{BackendHandle, BackendState, SeriesBackend, VectorBackend};
pub use compare::{CompareResponse, ComparisonResult, NO_MATCH_MESSAGE, PriceStats, StoreAverage};
pub use config::Settings;
pub use engine::PriceIntelligence;
pub use error::{ConfigError, ConfigResult, SeriesResult, VectorResult};
pub use recommend::{Recommendation, RecommendationKind};
pub use series::{AggregateOp, InMemorySeriesStore, PricePoint, SeriesError, WindowStats};
pub use types::{ItemId, ItemKey, ItemMeta, ItemRecord, TimestampMs};
pub use vector::{
    EMBEDDING_DIMENSION, Embedder, HashEmbedder, InMemoryVectorIndex, ScoredMatch,
    VectorDimension, VectorError,
};

//! The price intelligence facade.
//!
//! Owns the embedder, the backend handle, and the settings, and exposes
//! the two function-call contracts of the core: item ingestion (from the
//! receipt pipeline) and comparison queries (from the API layer).

use crate::backend::BackendHandle;
use crate::compare::{CompareResponse, ComparisonResult, price_stats, store_averages};
use crate::config::Settings;
use crate::error::VectorResult;
use crate::recommend::{RecommendationContext, synthesize};
use crate::series::{AggregateOp, WindowStats};
use crate::types::{ItemId, ItemKey, ItemRecord, TimestampMs};
use crate::vector::{Embedder, HashEmbedder};
use tracing::debug;

/// Entry point for ingestion and comparison.
///
/// All operations are synchronous request/response calls; concurrent
/// ingestion and queries interleave safely through the backend locks.
pub struct PriceIntelligence {
    embedder: HashEmbedder,
    backend: BackendHandle,
    settings: Settings,
}

impl PriceIntelligence {
    /// Connects the backends described by `settings` and builds the
    /// engine around them.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let backend = BackendHandle::connect(&settings);
        Self::with_backend(settings, backend)
    }

    /// Builds the engine around an existing backend handle.
    #[must_use]
    pub fn with_backend(settings: Settings, backend: BackendHandle) -> Self {
        let embedder = match crate::vector::VectorDimension::new(settings.embedding.dimension) {
            Ok(dim) => HashEmbedder::with_dimension(dim),
            // Invalid dimension is caught by Settings::load; default
            // construction falls back to the standard size.
            Err(_) => HashEmbedder::new(),
        };
        Self {
            embedder,
            backend,
            settings,
        }
    }

    /// The backend handle this engine operates on.
    #[must_use]
    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    /// Indexes one parsed line item and records its price observation.
    ///
    /// Called once per item by the receipt pipeline; each item is
    /// independent and may be retried individually on failure.
    pub fn ingest(&self, item: &ItemRecord) -> VectorResult<()> {
        debug!(id = %item.id, name = %item.name, "ingesting item");
        let vector = self.embedder.embed(&item.name);
        self.backend
            .vector()
            .upsert(item.id.clone(), vector, item.meta())?;
        self.backend
            .series()
            .record(&item.key(), item.timestamp, item.price, &item.store_name);
        Ok(())
    }

    /// Removes the item's index entry.
    ///
    /// Historical series points are deliberately left in place: deletion
    /// does not rewrite price history.
    pub fn remove(&self, id: &ItemId) {
        self.backend.vector().remove(id);
    }

    /// Wholesale edit: drop the old entry and ingest the replacement.
    pub fn replace(&self, item: &ItemRecord) -> VectorResult<()> {
        self.remove(&item.id);
        self.ingest(item)
    }

    /// Compares an item name against everything indexed.
    ///
    /// `limit` caps the number of candidate matches (defaults to the
    /// configured search limit).
    #[must_use]
    pub fn compare(&self, item_name: &str, limit: Option<usize>) -> CompareResponse {
        self.compare_at(item_name, limit, TimestampMs::now())
    }

    /// [`Self::compare`] with an explicit clock, for deterministic tests.
    #[must_use]
    pub fn compare_at(
        &self,
        item_name: &str,
        limit: Option<usize>,
        now: TimestampMs,
    ) -> CompareResponse {
        let k = limit.unwrap_or(self.settings.search.default_limit);
        let query = self.embedder.embed(item_name);
        let mut matches = self.backend.vector().knn(&query, k);
        matches.retain(|m| m.similarity > self.settings.search.min_similarity);

        if matches.is_empty() {
            debug!(item_name, "no similar items");
            return CompareResponse::no_match();
        }

        let stores = store_averages(&matches);
        let stats = price_stats(&matches, &stores);

        let key = ItemKey::from_name(item_name);
        let from = now.saturating_sub(self.settings.timeseries.trend_window_ms());
        let series = self.backend.series();
        let trend = series.range_at(&key, from, now, now);
        let window = WindowStats {
            min: series.aggregate_at(&key, from, now, AggregateOp::Min, now),
            max: series.aggregate_at(&key, from, now, AggregateOp::Max, now),
            avg: series.aggregate_at(&key, from, now, AggregateOp::Avg, now),
        };

        let ctx = RecommendationContext {
            matches: &matches,
            stores: &stores,
            stats: &stats,
            trend: &trend,
            window: &window,
        };
        let recommendations = synthesize(&ctx, &self.settings.recommendations);

        CompareResponse::Report(ComparisonResult {
            item_name: item_name.to_string(),
            total_items: matches.len(),
            price_stats: stats,
            store_comparison: stores,
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, price: f64, store: &str, ts: u64) -> ItemRecord {
        ItemRecord {
            id: ItemId::new(id),
            name: name.to_string(),
            price,
            store_name: store.to_string(),
            timestamp: TimestampMs::new(ts),
        }
    }

    #[test]
    fn compare_on_empty_engine_returns_no_match() {
        let engine = PriceIntelligence::new(Settings::default());
        let response = engine.compare_at("milk", None, TimestampMs::new(1_000_000));
        assert!(response.report().is_none());
    }

    #[test]
    fn ingest_then_compare_round_trip() {
        let engine = PriceIntelligence::new(Settings::default());
        let now = TimestampMs::new(3_600_000);
        engine
            .ingest(&record("1", "Organic Apples", 2.5, "StoreA", 1_000))
            .unwrap();

        let response = engine.compare_at("organic apples", None, now);
        let report = response.report().expect("expected a report");
        assert_eq!(report.total_items, 1);
        assert_eq!(report.price_stats.avg_price, 2.5);
        assert_eq!(report.store_comparison[0].store, "StoreA");
    }

    #[test]
    fn remove_drops_the_match_but_keeps_history() {
        let engine = PriceIntelligence::new(Settings::default());
        let now = TimestampMs::new(3_600_000);
        let item = record("1", "Bananas", 1.5, "StoreA", 1_000);
        engine.ingest(&item).unwrap();
        engine.remove(&item.id);

        assert!(engine.compare_at("bananas", None, now).report().is_none());
        // Series points survive item deletion
        let points = engine.backend().series().range_at(
            &ItemKey::from_name("Bananas"),
            TimestampMs::new(0),
            now,
            now,
        );
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn replace_swaps_the_entry_wholesale() {
        let engine = PriceIntelligence::new(Settings::default());
        let now = TimestampMs::new(3_600_000);
        engine
            .ingest(&record("1", "Bananas", 1.5, "StoreA", 1_000))
            .unwrap();
        engine
            .replace(&record("1", "Bananas", 1.9, "StoreB", 2_000))
            .unwrap();

        let response = engine.compare_at("bananas", None, now);
        let report = response.report().expect("expected a report");
        assert_eq!(report.total_items, 1);
        assert_eq!(report.price_stats.avg_price, 1.9);
        assert_eq!(report.store_comparison[0].store, "StoreB");
    }

    #[test]
    fn degraded_backend_compares_to_no_match() {
        let engine =
            PriceIntelligence::with_backend(Settings::default(), BackendHandle::degraded());
        engine
            .ingest(&record("1", "Milk", 3.5, "StoreA", 1_000))
            .unwrap();
        let response = engine.compare_at("milk", None, TimestampMs::new(1_000_000));
        assert!(response.report().is_none());
    }
}

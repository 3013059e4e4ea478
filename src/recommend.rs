//! Recommendation synthesis.
//!
//! A pure, ordered pipeline of independent insight generators. Each step
//! inspects the comparison context and emits at most one recommendation;
//! the composition order is fixed and observable, so callers may rely on
//! e.g. `store_recommendation` always preceding `price_volatility`.
//!
//! Every ratio guards its denominator: a degenerate zero average or zero
//! oldest price silently omits the affected recommendation instead of
//! producing NaN or infinity.

use crate::compare::{PriceStats, StoreAverage};
use crate::config::RecommendationConfig;
use crate::series::{PricePoint, WindowStats};
use crate::vector::ScoredMatch;
use serde::Serialize;

/// The fixed set of insight types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Overpaid,
    GoodDeal,
    StoreRecommendation,
    PriceVolatility,
    Alternatives,
    BestDeal,
    PriceTrend,
    TimeAnalysis,
}

/// One insight with its human-readable message and savings figure.
///
/// Produced fresh per query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    /// Dollar amount, always >= 0 when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<f64>,
}

/// Everything the pipeline looks at, borrowed from the comparison engine.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationContext<'a> {
    /// Matches ranked by descending similarity; the first entry is the
    /// most relevant paid price.
    pub matches: &'a [ScoredMatch],
    /// Per-store averages in first-seen order.
    pub stores: &'a [StoreAverage],
    /// Global stats (item-level mean, store-level min/max).
    pub stats: &'a PriceStats,
    /// Trend points for the query window, ascending by time.
    pub trend: &'a [PricePoint],
    /// Aggregates for the query window.
    pub window: &'a WindowStats,
}

type Step = fn(&RecommendationContext<'_>, &RecommendationConfig) -> Option<Recommendation>;

/// The pipeline, in its documented fixed order.
const STEPS: [Step; 7] = [
    price_position,
    store_recommendation,
    price_volatility,
    alternatives,
    best_deal,
    price_trend,
    time_analysis,
];

/// Runs the full pipeline over the context.
#[must_use]
pub fn synthesize(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Vec<Recommendation> {
    STEPS.iter().filter_map(|step| step(ctx, config)).collect()
}

/// Step 1: how the most relevant paid price sits against the average.
fn price_position(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    let avg = ctx.stats.avg_price;
    let paid = ctx.matches.first()?.price;
    // A zero paid price is missing data, not a 100% discount
    if avg <= 0.0 || paid <= 0.0 {
        return None;
    }
    let diff_percent = (paid - avg) / avg * 100.0;

    if diff_percent > config.overpaid_percent {
        Some(Recommendation {
            kind: RecommendationKind::Overpaid,
            message: format!(
                "You paid {diff_percent:.1}% more than average (${paid:.2} vs ${avg:.2})"
            ),
            savings: Some(paid - avg),
        })
    } else if diff_percent < -config.good_deal_percent {
        Some(Recommendation {
            kind: RecommendationKind::GoodDeal,
            message: format!(
                "Great deal! You paid {:.1}% less than average",
                diff_percent.abs()
            ),
            savings: Some(avg - paid),
        })
    } else {
        None
    }
}

/// Step 2: cheapest store versus most expensive store.
fn store_recommendation(
    ctx: &RecommendationContext<'_>,
    _config: &RecommendationConfig,
) -> Option<Recommendation> {
    if ctx.stores.len() < 2 {
        return None;
    }
    // First store wins ties, matching first-seen grouping order
    let best = ctx
        .stores
        .iter()
        .reduce(|min, s| if s.avg_price < min.avg_price { s } else { min })?;
    let worst = ctx
        .stores
        .iter()
        .reduce(|max, s| if s.avg_price > max.avg_price { s } else { max })?;

    let savings = worst.avg_price - best.avg_price;
    Some(Recommendation {
        kind: RecommendationKind::StoreRecommendation,
        message: format!(
            "{} has the best prices - save ${savings:.2} vs {}",
            best.store, worst.store
        ),
        savings: Some(savings),
    })
}

/// Step 3: spread between store averages relative to the global mean.
fn price_volatility(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    let avg = ctx.stats.avg_price;
    if avg <= 0.0 {
        return None;
    }
    let range = ctx.stats.max_price - ctx.stats.min_price;
    let range_percent = range / avg * 100.0;
    if range_percent <= config.volatility_percent {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::PriceVolatility,
        message: format!(
            "High price variation: {range_percent:.1}% difference between stores (${:.2} - ${:.2})",
            ctx.stats.min_price, ctx.stats.max_price
        ),
        savings: Some(range),
    })
}

/// Step 4: count of high-similarity alternatives and their mean price.
fn alternatives(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    let similar: Vec<&ScoredMatch> = ctx
        .matches
        .iter()
        .filter(|m| m.similarity > config.alternative_similarity)
        .collect();
    if similar.len() <= config.alternative_count {
        return None;
    }
    let mean = similar.iter().map(|m| m.price).sum::<f64>() / similar.len() as f64;
    Some(Recommendation {
        kind: RecommendationKind::Alternatives,
        message: format!("Found {} similar items averaging ${mean:.2}", similar.len()),
        savings: Some((ctx.stats.avg_price - mean).abs()),
    })
}

/// Step 5: single cheapest matched item, when clearly below average.
fn best_deal(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    let avg = ctx.stats.avg_price;
    if avg <= 0.0 {
        return None;
    }
    // First match wins ties, mirroring the ranked order
    let cheapest = ctx
        .matches
        .iter()
        .reduce(|min, m| if m.price < min.price { m } else { min })?;
    if cheapest.price >= avg * config.best_deal_ratio {
        return None;
    }
    let below_percent = (avg - cheapest.price) / avg * 100.0;
    Some(Recommendation {
        kind: RecommendationKind::BestDeal,
        message: format!(
            "Best deal: {} at ${:.2} ({below_percent:.1}% below average)",
            cheapest.store_name, cheapest.price
        ),
        savings: Some(avg - cheapest.price),
    })
}

/// Step 6: oldest-to-newest movement in the trend window.
fn price_trend(
    ctx: &RecommendationContext<'_>,
    config: &RecommendationConfig,
) -> Option<Recommendation> {
    if ctx.trend.len() < 2 {
        return None;
    }
    let oldest = ctx.trend.first()?.price;
    let newest = ctx.trend.last()?.price;
    if oldest <= 0.0 {
        return None;
    }
    let trend_percent = (newest - oldest) / oldest * 100.0;
    if trend_percent.abs() <= config.trend_percent {
        return None;
    }
    let direction = if trend_percent > 0.0 {
        "increased"
    } else {
        "decreased"
    };
    Some(Recommendation {
        kind: RecommendationKind::PriceTrend,
        message: format!(
            "Price has {direction} {:.1}% in the last 24 hours",
            trend_percent.abs()
        ),
        savings: Some((newest - oldest).abs()),
    })
}

/// Step 7: min/max/avg summary of the trend window.
fn time_analysis(
    ctx: &RecommendationContext<'_>,
    _config: &RecommendationConfig,
) -> Option<Recommendation> {
    let (min, max, avg) = match (ctx.window.min, ctx.window.max, ctx.window.avg) {
        (Some(min), Some(max), Some(avg)) => (min, max, avg),
        _ => return None,
    };
    Some(Recommendation {
        kind: RecommendationKind::TimeAnalysis,
        message: format!("24h range: ${min:.2} - ${max:.2} (avg: ${avg:.2})"),
        savings: Some(max - min),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, TimestampMs};

    fn matched(id: &str, price: f64, store: &str, similarity: f32) -> ScoredMatch {
        ScoredMatch {
            id: ItemId::new(id),
            name: id.to_string(),
            price,
            store_name: store.to_string(),
            similarity,
        }
    }

    fn point(ts: u64, price: f64) -> PricePoint {
        PricePoint {
            timestamp: TimestampMs::new(ts),
            price,
            store: "S".to_string(),
        }
    }

    struct Fixture {
        matches: Vec<ScoredMatch>,
        stores: Vec<StoreAverage>,
        stats: PriceStats,
        trend: Vec<PricePoint>,
        window: WindowStats,
    }

    impl Fixture {
        fn new(matches: Vec<ScoredMatch>) -> Self {
            let stores = crate::compare::store_averages(&matches);
            let stats = crate::compare::price_stats(&matches, &stores);
            Self {
                matches,
                stores,
                stats,
                trend: Vec::new(),
                window: WindowStats::default(),
            }
        }

        fn ctx(&self) -> RecommendationContext<'_> {
            RecommendationContext {
                matches: &self.matches,
                stores: &self.stores,
                stats: &self.stats,
                trend: &self.trend,
                window: &self.window,
            }
        }
    }

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn overpaid_requires_strictly_more_than_the_band() {
        let config = RecommendationConfig::default();
        // avg 10.0; paid exactly +15% -> no signal
        let fx = Fixture::new(vec![
            matched("a", 11.5, "A", 0.9),
            matched("b", 8.5, "A", 0.8),
        ]);
        assert!(price_position(&fx.ctx(), &config).is_none());

        // Paid clearly above the band
        let fx = Fixture::new(vec![
            matched("a", 12.0, "A", 0.9),
            matched("b", 8.0, "A", 0.8),
        ]);
        let rec = price_position(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.kind, RecommendationKind::Overpaid);
        assert_eq!(rec.message, "You paid 20.0% more than average ($12.00 vs $10.00)");
        assert_eq!(rec.savings, Some(2.0));
    }

    #[test]
    fn good_deal_below_the_band() {
        let config = RecommendationConfig::default();
        // avg 4.25, paid 3.50 -> -17.6%
        let fx = Fixture::new(vec![
            matched("a", 3.50, "A", 0.9),
            matched("b", 5.00, "B", 0.8),
        ]);
        let rec = price_position(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.kind, RecommendationKind::GoodDeal);
        assert_eq!(rec.message, "Great deal! You paid 17.6% less than average");
        assert_eq!(rec.savings, Some(0.75));
    }

    #[test]
    fn zero_paid_price_emits_no_position_signal() {
        let config = RecommendationConfig::default();
        // Top match priced 0.0 would read as a 100% discount; treat it
        // as missing data and stay quiet.
        let fx = Fixture::new(vec![
            matched("a", 0.0, "A", 0.9),
            matched("b", 8.0, "B", 0.8),
        ]);
        assert!(price_position(&fx.ctx(), &config).is_none());
    }

    #[test]
    fn equal_to_average_emits_nothing() {
        let config = RecommendationConfig::default();
        let fx = Fixture::new(vec![matched("a", 10.0, "A", 0.9)]);
        let recs = synthesize(&fx.ctx(), &config);
        assert!(recs.is_empty(), "got {recs:?}");
    }

    #[test]
    fn single_store_never_emits_store_recommendation() {
        let config = RecommendationConfig::default();
        let fx = Fixture::new(vec![
            matched("a", 1.0, "OnlyStore", 0.9),
            matched("b", 9.0, "OnlyStore", 0.8),
        ]);
        assert!(store_recommendation(&fx.ctx(), &config).is_none());
    }

    #[test]
    fn store_recommendation_names_cheapest_and_gap() {
        let config = RecommendationConfig::default();
        let fx = Fixture::new(vec![
            matched("a", 5.00, "StoreB", 0.9),
            matched("b", 3.50, "StoreA", 0.8),
        ]);
        let rec = store_recommendation(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "StoreA has the best prices - save $1.50 vs StoreB");
        assert_eq!(rec.savings, Some(1.5));
    }

    #[test]
    fn volatility_uses_store_average_spread() {
        let config = RecommendationConfig::default();
        // Store averages 2.0 and 5.0; item avg 3.5 -> spread 85.7%
        let fx = Fixture::new(vec![
            matched("a", 2.0, "A", 0.9),
            matched("b", 5.0, "B", 0.8),
        ]);
        let rec = price_volatility(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.kind, RecommendationKind::PriceVolatility);
        assert_eq!(rec.savings, Some(3.0));

        // Tight spread stays quiet: 10.0 vs 11.0 around avg 10.5 is ~9.5%
        let fx = Fixture::new(vec![
            matched("a", 10.0, "A", 0.9),
            matched("b", 11.0, "B", 0.8),
        ]);
        assert!(price_volatility(&fx.ctx(), &config).is_none());
    }

    #[test]
    fn alternatives_need_more_than_three_high_similarity_matches() {
        let config = RecommendationConfig::default();
        let fx = Fixture::new(vec![
            matched("a", 4.0, "A", 0.95),
            matched("b", 4.0, "A", 0.90),
            matched("c", 4.0, "A", 0.85),
        ]);
        // Three qualifying matches is not enough
        assert!(alternatives(&fx.ctx(), &config).is_none());

        let fx = Fixture::new(vec![
            matched("a", 4.0, "A", 0.95),
            matched("b", 5.0, "A", 0.90),
            matched("c", 4.0, "A", 0.85),
            matched("d", 3.0, "A", 0.81),
            matched("e", 9.0, "A", 0.5), // below the similarity bar
        ]);
        let rec = alternatives(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "Found 4 similar items averaging $4.00");
    }

    #[test]
    fn best_deal_requires_price_below_85_percent_of_average() {
        let config = RecommendationConfig::default();
        // avg 10.0, cheapest exactly 8.5 -> no signal (strict inequality)
        let fx = Fixture::new(vec![
            matched("a", 11.5, "A", 0.9),
            matched("b", 8.5, "B", 0.8),
        ]);
        assert!(best_deal(&fx.ctx(), &config).is_none());

        let fx = Fixture::new(vec![
            matched("a", 12.0, "A", 0.9),
            matched("b", 8.0, "B", 0.8),
        ]);
        let rec = best_deal(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "Best deal: B at $8.00 (20.0% below average)");
        assert_eq!(rec.savings, Some(2.0));
    }

    #[test]
    fn trend_needs_two_points_and_a_five_percent_move() {
        let config = RecommendationConfig::default();
        let mut fx = Fixture::new(vec![matched("a", 10.0, "A", 0.9)]);

        fx.trend = vec![point(1, 2.0)];
        assert!(price_trend(&fx.ctx(), &config).is_none());

        fx.trend = vec![point(1, 2.0), point(2, 2.06)];
        // +3%, under the threshold
        assert!(price_trend(&fx.ctx(), &config).is_none());

        fx.trend = vec![point(1, 2.0), point(2, 2.5)];
        let rec = price_trend(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "Price has increased 25.0% in the last 24 hours");
        assert_eq!(rec.savings, Some(0.5));

        fx.trend = vec![point(1, 2.5), point(2, 2.0)];
        let rec = price_trend(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "Price has decreased 20.0% in the last 24 hours");
    }

    #[test]
    fn trend_with_zero_oldest_price_is_omitted() {
        let config = RecommendationConfig::default();
        let mut fx = Fixture::new(vec![matched("a", 10.0, "A", 0.9)]);
        fx.trend = vec![point(1, 0.0), point(2, 2.0)];
        assert!(price_trend(&fx.ctx(), &config).is_none());
    }

    #[test]
    fn time_analysis_needs_all_three_aggregates() {
        let config = RecommendationConfig::default();
        let mut fx = Fixture::new(vec![matched("a", 10.0, "A", 0.9)]);

        fx.window = WindowStats {
            min: Some(2.0),
            max: Some(3.0),
            avg: None,
        };
        assert!(time_analysis(&fx.ctx(), &config).is_none());

        fx.window = WindowStats {
            min: Some(2.0),
            max: Some(3.0),
            avg: Some(2.5),
        };
        let rec = time_analysis(&fx.ctx(), &config).unwrap();
        assert_eq!(rec.message, "24h range: $2.00 - $3.00 (avg: $2.50)");
        assert_eq!(rec.savings, Some(1.0));
    }

    #[test]
    fn pipeline_emits_in_the_documented_order() {
        let config = RecommendationConfig::default();
        // Wide spread across two stores plus a strong trend
        let mut fx = Fixture::new(vec![
            matched("a", 12.0, "StoreB", 0.9),
            matched("b", 6.0, "StoreA", 0.8),
        ]);
        fx.trend = vec![point(1, 6.0), point(2, 12.0)];
        fx.window = WindowStats {
            min: Some(6.0),
            max: Some(12.0),
            avg: Some(9.0),
        };

        let recs = synthesize(&fx.ctx(), &config);
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::Overpaid,
                RecommendationKind::StoreRecommendation,
                RecommendationKind::PriceVolatility,
                RecommendationKind::BestDeal,
                RecommendationKind::PriceTrend,
                RecommendationKind::TimeAnalysis,
            ]
        );
    }

    #[test]
    fn kind_serializes_as_snake_case_type_field() {
        let rec = Recommendation {
            kind: RecommendationKind::StoreRecommendation,
            message: "msg".to_string(),
            savings: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "store_recommendation");
        assert!(json.get("savings").is_none());
    }
}

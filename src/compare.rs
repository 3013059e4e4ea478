//! Comparison results and the summary statistics behind them.
//!
//! A comparison is ephemeral: computed per query, serialized for the
//! caller, never persisted. The JSON field names (camelCase) are part of
//! the external contract, as is the deliberately minimal shape returned
//! when no similar items exist.

use crate::recommend::Recommendation;
use crate::vector::ScoredMatch;
use serde::Serialize;

/// Exact message of the no-match response shape.
pub const NO_MATCH_MESSAGE: &str = "No similar items found";

/// Global price statistics over the matched items.
///
/// `avg_price` is the mean of all matched items' individual prices, while
/// `min_price`/`max_price` come from the per-store averages. The asymmetry
/// (store-level min/max, item-level mean) is intentional, observable
/// behavior and must not be "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Average price and observation count for one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAverage {
    pub store: String,
    pub avg_price: f64,
    pub count: usize,
}

/// Full comparison report for one queried item name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub item_name: String,
    pub total_items: usize,
    pub price_stats: PriceStats,
    pub store_comparison: Vec<StoreAverage>,
    pub recommendations: Vec<Recommendation>,
}

/// Outcome of a comparison query.
///
/// Zero matches produce the minimal `{"message": ...}` shape rather than
/// a report full of empty statistics; callers branch on it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CompareResponse {
    NoMatch { message: String },
    Report(ComparisonResult),
}

impl CompareResponse {
    /// The canonical no-match response.
    #[must_use]
    pub fn no_match() -> Self {
        Self::NoMatch {
            message: NO_MATCH_MESSAGE.to_string(),
        }
    }

    /// The report, if this response carries one.
    #[must_use]
    pub fn report(&self) -> Option<&ComparisonResult> {
        match self {
            Self::Report(result) => Some(result),
            Self::NoMatch { .. } => None,
        }
    }
}

/// Groups matches by store, in first-seen order, into average and count.
///
/// First-seen ordering keeps the output deterministic for a given match
/// ranking instead of leaking hash-map iteration order.
pub(crate) fn store_averages(matches: &[ScoredMatch]) -> Vec<StoreAverage> {
    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    for m in matches {
        match sums.iter_mut().find(|(store, _, _)| *store == m.store_name) {
            Some((_, sum, count)) => {
                *sum += m.price;
                *count += 1;
            }
            None => sums.push((m.store_name.clone(), m.price, 1)),
        }
    }
    sums.into_iter()
        .map(|(store, sum, count)| StoreAverage {
            store,
            avg_price: sum / count as f64,
            count,
        })
        .collect()
}

/// Computes the global stats from matches and per-store averages.
///
/// Callers guarantee both slices are non-empty (the comparison engine
/// short-circuits to a no-match response before this point).
pub(crate) fn price_stats(matches: &[ScoredMatch], stores: &[StoreAverage]) -> PriceStats {
    let avg_price = matches.iter().map(|m| m.price).sum::<f64>() / matches.len() as f64;
    let min_price = stores
        .iter()
        .map(|s| s.avg_price)
        .fold(f64::INFINITY, f64::min);
    let max_price = stores
        .iter()
        .map(|s| s.avg_price)
        .fold(f64::NEG_INFINITY, f64::max);
    PriceStats {
        avg_price,
        min_price,
        max_price,
    }
}

//! Configuration module for the price intelligence core.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PRICELENS_` and use double
//! underscores to separate nested levels:
//! - `PRICELENS_SEARCH__DEFAULT_LIMIT=20` sets `search.default_limit`
//! - `PRICELENS_TIMESERIES__RETENTION_HOURS=48` sets `timeseries.retention_hours`
//! - `PRICELENS_RECOMMENDATIONS__OVERPAID_PERCENT=20.0` sets
//!   `recommendations.overpaid_percent`
//!
//! Every recommendation threshold is configurable, but the defaults match
//! the production policy constants and should normally stay untouched.

use crate::error::{ConfigError, ConfigResult};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Embedding settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Similarity search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Price time-series settings
    #[serde(default)]
    pub timeseries: TimeSeriesConfig,

    /// Recommendation policy thresholds
    #[serde(default)]
    pub recommendations: RecommendationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Embedding vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Default KNN result limit for comparison queries
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Matches at or below this similarity are dropped from comparisons.
    /// The hashed embedder scores unrelated names near zero, so a small
    /// floor separates genuine variants from index noise.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TimeSeriesConfig {
    /// Retention window for price points, in hours
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,

    /// Window used for trend and aggregate lookups, in hours
    #[serde(default = "default_trend_window_hours")]
    pub trend_window_hours: u64,
}

impl TimeSeriesConfig {
    /// Retention window as a `Duration`.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_hours * 3600)
    }

    /// Trend window in milliseconds.
    #[must_use]
    pub fn trend_window_ms(&self) -> u64 {
        self.trend_window_hours * 3_600_000
    }
}

/// Fixed policy constants for the recommendation pipeline.
///
/// Exposed as configuration for tuning, but defaults must keep behavioral
/// parity with the originating system.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecommendationConfig {
    /// Paid-above-average percentage that triggers `overpaid`
    #[serde(default = "default_overpaid_percent")]
    pub overpaid_percent: f64,

    /// Paid-below-average percentage that triggers `good_deal`
    #[serde(default = "default_good_deal_percent")]
    pub good_deal_percent: f64,

    /// Store-spread-over-average percentage that triggers `price_volatility`
    #[serde(default = "default_volatility_percent")]
    pub volatility_percent: f64,

    /// Similarity above which a match counts as an alternative
    #[serde(default = "default_alternative_similarity")]
    pub alternative_similarity: f32,

    /// More than this many alternatives triggers `alternatives`
    #[serde(default = "default_alternative_count")]
    pub alternative_count: usize,

    /// Cheapest item below this fraction of average triggers `best_deal`
    #[serde(default = "default_best_deal_ratio")]
    pub best_deal_ratio: f64,

    /// Trend magnitude percentage that triggers `price_trend`
    #[serde(default = "default_trend_percent")]
    pub trend_percent: f64,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_dimension() -> usize {
    crate::vector::EMBEDDING_DIMENSION
}
fn default_limit() -> usize {
    50
}
fn default_min_similarity() -> f32 {
    0.1
}
fn default_retention_hours() -> u64 {
    24
}
fn default_trend_window_hours() -> u64 {
    24
}
fn default_overpaid_percent() -> f64 {
    15.0
}
fn default_good_deal_percent() -> f64 {
    10.0
}
fn default_volatility_percent() -> f64 {
    30.0
}
fn default_alternative_similarity() -> f32 {
    0.8
}
fn default_alternative_count() -> usize {
    3
}
fn default_best_deal_ratio() -> f64 {
    0.85
}
fn default_trend_percent() -> f64 {
    5.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            timeseries: TimeSeriesConfig::default(),
            recommendations: RecommendationConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            min_similarity: default_min_similarity(),
        }
    }
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            retention_hours: default_retention_hours(),
            trend_window_hours: default_trend_window_hours(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            overpaid_percent: default_overpaid_percent(),
            good_deal_percent: default_good_deal_percent(),
            volatility_percent: default_volatility_percent(),
            alternative_similarity: default_alternative_similarity(),
            alternative_count: default_alternative_count(),
            best_deal_ratio: default_best_deal_ratio(),
            trend_percent: default_trend_percent(),
        }
    }
}

impl Settings {
    /// Loads settings from `pricelens.toml` (if present) and the
    /// environment, layered over the defaults.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from("pricelens.toml")
    }

    /// Loads settings from a specific TOML file plus the environment.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PRICELENS_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Invalid {
                reason: "embedding.dimension must be positive".to_string(),
            });
        }
        if self.search.default_limit == 0 {
            return Err(ConfigError::Invalid {
                reason: "search.default_limit must be positive".to_string(),
            });
        }
        if self.timeseries.retention_hours == 0 {
            return Err(ConfigError::Invalid {
                reason: "timeseries.retention_hours must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_production_policy() {
        let settings = Settings::default();
        assert_eq!(settings.embedding.dimension, 128);
        assert_eq!(settings.search.default_limit, 50);
        assert_eq!(settings.timeseries.retention_hours, 24);

        let rec = &settings.recommendations;
        assert_eq!(rec.overpaid_percent, 15.0);
        assert_eq!(rec.good_deal_percent, 10.0);
        assert_eq!(rec.volatility_percent, 30.0);
        assert_eq!(rec.alternative_similarity, 0.8);
        assert_eq!(rec.alternative_count, 3);
        assert_eq!(rec.best_deal_ratio, 0.85);
        assert_eq!(rec.trend_percent, 5.0);
    }

    // Loading tests run inside figment::Jail: it isolates the process
    // environment and serializes the tests that touch it.
    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "pricelens.toml",
                r#"
[search]
default_limit = 10

[timeseries]
retention_hours = 48
"#,
            )?;

            let settings = Settings::load_from("pricelens.toml").unwrap();
            assert_eq!(settings.search.default_limit, 10);
            assert_eq!(settings.timeseries.retention_hours, 48);
            // Untouched sections keep their defaults
            assert_eq!(settings.embedding.dimension, 128);
            assert_eq!(settings.recommendations.overpaid_percent, 15.0);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pricelens.toml", "[search]\ndefault_limit = 0\n")?;

            let result = Settings::load_from("pricelens.toml");
            assert!(matches!(result, Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("pricelens.toml", "[search]\ndefault_limit = 10\n")?;
            jail.set_env("PRICELENS_SEARCH__DEFAULT_LIMIT", "7");

            let settings = Settings::load_from("pricelens.toml").unwrap();
            assert_eq!(settings.search.default_limit, 7);
            Ok(())
        });
    }

    #[test]
    fn retention_duration_conversion() {
        let ts = TimeSeriesConfig {
            retention_hours: 24,
            trend_window_hours: 24,
        };
        assert_eq!(ts.retention(), Duration::from_secs(86_400));
        assert_eq!(ts.trend_window_ms(), 86_400_000);
    }
}

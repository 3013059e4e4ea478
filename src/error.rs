//! Error types for the price intelligence core.
//!
//! Subsystem errors live next to their types ([`crate::vector::VectorError`],
//! [`crate::series::SeriesError`]); this module holds the configuration
//! error and the crate-wide `Result` aliases.
//!
//! Nothing in this core is designed to be fatal to the enclosing process:
//! backend trouble degrades to empty results at the capability boundary,
//! and numeric degeneracy silently omits the affected recommendation.

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Failed to load configuration: {0}\nSuggestion: Check the TOML syntax and any PRICELENS_* environment variables"
    )]
    Load(#[from] figment::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for vector index operations
pub type VectorResult<T> = Result<T, crate::vector::VectorError>;

/// Result type alias for time-series operations
pub type SeriesResult<T> = Result<T, crate::series::SeriesError>;

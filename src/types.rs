//! Shared core types for items, series keys, and timestamps.
//!
//! Newtypes here follow the project's strict type safety guidelines:
//! item identifiers, normalized series keys, and epoch timestamps are
//! distinct types so they cannot be confused at call sites.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an item record.
///
/// Produced by the receipt pipeline (outside this crate); the core never
/// inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized item name used to key a price series.
///
/// Invariant: all name variants that normalize identically land on the
/// same series, so cross-store prices aggregate under one key regardless
/// of original casing or spacing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey(String);

impl ItemKey {
    /// Builds a key by lower-casing the name and collapsing whitespace
    /// runs into single `_` separators.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let key = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        Self(key)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Milliseconds since the Unix epoch.
///
/// The originating receipt pipeline reports observation times in epoch
/// milliseconds, so the core keeps the same unit end to end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TimestampMs(u64);

impl TimestampMs {
    #[must_use]
    pub const fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        // timestamp_millis is negative only before 1970
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }

    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Timestamp `millis` earlier, saturating at the epoch.
    #[must_use]
    pub const fn saturating_sub(&self, millis: u64) -> Self {
        Self(self.0.saturating_sub(millis))
    }
}

impl fmt::Display for TimestampMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Denormalized item fields carried alongside each index entry.
///
/// Kept on the entry so comparison and recommendation logic need only
/// index results, never a join back to the item store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub name: String,
    pub price: f64,
    pub store_name: String,
}

/// A parsed line item as delivered by the receipt pipeline.
///
/// Immutable once created; an edit replaces the record wholesale
/// (delete + recreate), never a partial in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub store_name: String,
    pub timestamp: TimestampMs,
}

impl ItemRecord {
    /// The denormalized fields stored with the item's index entry.
    #[must_use]
    pub fn meta(&self) -> ItemMeta {
        ItemMeta {
            name: self.name.clone(),
            price: self.price,
            store_name: self.store_name.clone(),
        }
    }

    /// Series key derived from this record's name.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        ItemKey::from_name(&self.name)
    }
}

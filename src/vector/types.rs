//! Type-safe wrappers and core types for the vector index.

use crate::types::{ItemId, ItemMeta};
use thiserror::Error;

/// Dimension of item-name embeddings.
///
/// Fixed at 128 to stay compatible with the flat / float32 / cosine
/// schema the index declares at construction.
pub const EMBEDDING_DIMENSION: usize = 128;

/// Type-safe wrapper for vector dimensions.
///
/// Ensures runtime validation of vector dimensions to prevent
/// mismatches between stored entries and query vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension` with validation.
    ///
    /// Returns an error if the dimension is zero.
    pub fn new(dim: usize) -> Result<Self, VectorError> {
        if dim == 0 {
            return Err(VectorError::InvalidDimension {
                dimension: 0,
                reason: "Vector dimension cannot be zero",
            });
        }
        Ok(Self(dim))
    }

    /// The standard 128-dimensional embedding size.
    #[must_use]
    pub const fn dimension_128() -> Self {
        Self(EMBEDDING_DIMENSION)
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Validates that a vector has the expected dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.0 {
            return Err(VectorError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// A KNN match: one index entry plus its similarity to the query.
///
/// Similarity is reported as `1 - cosine_distance`. For unit vectors it
/// lands roughly in `[0, 1]` but can be negative for dissimilar vectors;
/// callers must not assume non-negativity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub store_name: String,
    pub similarity: f32,
}

impl ScoredMatch {
    pub(crate) fn new(id: ItemId, meta: &ItemMeta, similarity: f32) -> Self {
        Self {
            id,
            name: meta.name.clone(),
            price: meta.price,
            store_name: meta.store_name.clone(),
            similarity,
        }
    }
}

/// Errors that can occur during vector index operations.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure stored vectors and queries use the same embedder"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid vector dimension: {dimension}\nReason: {reason}")]
    InvalidDimension {
        dimension: usize,
        reason: &'static str,
    },
}

//! In-memory flat vector index with cosine KNN search.
//!
//! The index declares its schema (dimension, cosine metric) once at
//! construction and stores entries whole under a `RwLock`, so concurrent
//! readers never observe a partially written vector. Searching an empty
//! index returns empty results, not an error.

use crate::backend::VectorBackend;
use crate::error::VectorResult;
use crate::types::{ItemId, ItemMeta};
use crate::vector::{ScoredMatch, VectorDimension};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredEntry {
    vector: Vec<f32>,
    meta: ItemMeta,
    /// Insertion sequence, used as the stable tie-break in KNN ordering.
    /// Preserved across upserts so a replaced entry keeps its rank slot.
    seq: u64,
}

#[derive(Debug, Default)]
struct IndexInner {
    entries: HashMap<ItemId, StoredEntry>,
    next_seq: u64,
}

/// Flat (exhaustive-scan) vector index over item-name embeddings.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    dimension: VectorDimension,
    inner: RwLock<IndexInner>,
}

impl InMemoryVectorIndex {
    /// Creates an empty index for vectors of the given dimension.
    #[must_use]
    pub fn new(dimension: VectorDimension) -> Self {
        Self {
            dimension,
            inner: RwLock::new(IndexInner::default()),
        }
    }

    /// Number of entries currently indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// The dimension this index was declared with.
    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

impl VectorBackend for InMemoryVectorIndex {
    fn upsert(&self, id: ItemId, vector: Vec<f32>, meta: ItemMeta) -> VectorResult<()> {
        self.dimension.validate_vector(&vector)?;

        let inner = &mut *self.inner.write();
        let seq = match inner.entries.get(&id) {
            Some(existing) => existing.seq,
            None => {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                seq
            }
        };
        inner.entries.insert(id, StoredEntry { vector, meta, seq });
        Ok(())
    }

    fn remove(&self, id: &ItemId) {
        // No-op when absent
        if self.inner.write().entries.remove(id).is_some() {
            debug!(item = %id, "removed index entry");
        }
    }

    fn knn(&self, query: &[f32], k: usize) -> Vec<ScoredMatch> {
        if self.dimension.validate_vector(query).is_err() || k == 0 {
            return Vec::new();
        }

        let inner = self.inner.read();
        let mut candidates: Vec<(u64, ScoredMatch)> = inner
            .entries
            .iter()
            .map(|(id, entry)| {
                // Similarity reported as 1 - cosine distance
                let similarity = cosine_similarity(query, &entry.vector);
                (entry.seq, ScoredMatch::new(id.clone(), &entry.meta, similarity))
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.1.similarity
                .partial_cmp(&a.1.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        candidates.truncate(k);
        candidates.into_iter().map(|(_, m)| m).collect()
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude, where the cosine
/// is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

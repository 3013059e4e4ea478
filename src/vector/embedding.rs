//! Deterministic embedding generation for item names.
//!
//! This is a cheap hashed bag-of-features embedding, not a semantic
//! model: similarity reflects shared words and character trigrams, not
//! meaning. Each normalized word hashes to one slot with full weight,
//! and each overlapping character trigram of the word hashes to a slot
//! with reduced weight, so `"Milk 2%"` and `"milk 2 percent"` overlap
//! strongly while unrelated names share (almost) no slots. The vector is
//! unit-normalized after accumulation.
//!
//! The hash is a hand-rolled FNV-1a so stored vectors stay stable across
//! toolchain upgrades; `std::hash` makes no such promise.

use crate::vector::{EMBEDDING_DIMENSION, VectorDimension};

/// Slot weight for a whole normalized word.
const WORD_WEIGHT: f32 = 1.0;

/// Slot weight for one character trigram within a word.
const TRIGRAM_WEIGHT: f32 = 0.5;

const TRIGRAM_LEN: usize = 3;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Trait for turning item name text into fixed-length vectors.
///
/// Implementations must be deterministic: identical input text yields an
/// identical vector across calls and process restarts, so that stored
/// entries and later queries remain comparable.
pub trait Embedder: Send + Sync {
    /// Generate the embedding for one item name.
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Get the dimension of embeddings produced by this embedder.
    #[must_use]
    fn dimension(&self) -> VectorDimension;
}

/// The hashed bag-of-features embedder used in production.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimension: VectorDimension,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl HashEmbedder {
    /// Creates an embedder with the standard 128 dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: VectorDimension::dimension_128(),
        }
    }

    /// Creates an embedder with a custom dimension.
    ///
    /// Stored vectors and queries must use the same dimension; mixing
    /// embedders of different sizes is rejected by the index.
    #[must_use]
    pub fn with_dimension(dimension: VectorDimension) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let dim = self.dimension.get();
        let mut vector = vec![0.0f32; dim];

        for word in normalize_words(text) {
            vector[slot(word.as_bytes(), dim)] += WORD_WEIGHT;
            if word.len() >= TRIGRAM_LEN {
                let bytes = word.as_bytes();
                for gram in bytes.windows(TRIGRAM_LEN) {
                    vector[slot(gram, dim)] += TRIGRAM_WEIGHT;
                }
            }
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut vector {
                *val /= magnitude;
            }
        }

        vector
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }
}

/// Lower-cases the text, strips non-alphanumeric/non-space characters,
/// and splits on whitespace.
fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn slot(bytes: &[u8], dim: usize) -> usize {
    (fnv1a_64(bytes) % dim as u64) as usize
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if mag_a == 0.0 || mag_b == 0.0 {
            return 0.0;
        }
        dot / (mag_a * mag_b)
    }

    #[test]
    fn embedding_is_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("Organic Apples 1lb");
        let b = embedder.embed("Organic Apples 1lb");
        assert_eq!(a, b);
    }

    #[test]
    fn embedding_has_unit_norm() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("whole wheat bread");
        assert_eq!(v.len(), EMBEDDING_DIMENSION);
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_input_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new();
        for text in ["", "   ", "!!! ???"] {
            let v = embedder.embed(text);
            assert_eq!(v.len(), EMBEDDING_DIMENSION);
            assert!(v.iter().all(|x| *x == 0.0), "expected zeros for {text:?}");
        }
    }

    #[test]
    fn punctuation_and_case_do_not_change_the_vector() {
        let embedder = HashEmbedder::new();
        // "Milk 2%" and "milk 2" normalize to the same words
        assert_eq!(embedder.embed("Milk 2%"), embedder.embed("milk 2"));
    }

    #[test]
    fn shared_words_dominate_similarity() {
        let embedder = HashEmbedder::new();
        let milk = embedder.embed("milk");
        let milk_2 = embedder.embed("Milk 2%");
        let milk_2_percent = embedder.embed("milk 2 percent");
        let bread = embedder.embed("Bread");

        let to_variant = cosine(&milk, &milk_2);
        let to_long_variant = cosine(&milk, &milk_2_percent);
        let to_unrelated = cosine(&milk, &bread);

        assert!(to_variant > 0.7, "got {to_variant}");
        assert!(to_long_variant > 0.5, "got {to_long_variant}");
        assert!(to_unrelated < 0.1, "got {to_unrelated}");
        assert!(to_variant > to_long_variant);
    }

    #[test]
    fn custom_dimension_is_respected() {
        let dim = VectorDimension::new(32).unwrap();
        let embedder = HashEmbedder::with_dimension(dim);
        assert_eq!(embedder.embed("bananas").len(), 32);
        assert_eq!(embedder.dimension().get(), 32);
    }
}

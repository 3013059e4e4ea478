//! Vector search functionality for price intelligence.
//!
//! Item names become fixed-length vectors through a deterministic hashed
//! embedding, and a flat cosine-similarity index answers K-nearest-neighbor
//! queries over them. The index is an approximate matcher by design: it
//! finds "the same item" across heterogeneous free-text names, it does not
//! guarantee exact duplicate detection.

mod embedding;
mod index;
mod types;

// Re-export core types for public API
pub use embedding::{Embedder, HashEmbedder};
pub use index::{InMemoryVectorIndex, cosine_similarity};
pub use types::{EMBEDDING_DIMENSION, ScoredMatch, VectorDimension, VectorError};

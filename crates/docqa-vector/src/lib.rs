//! Vector storage and similarity retrieval over document chunks.

pub mod distance;
pub mod index;
pub mod retriever;

pub use distance::cosine_similarity;
pub use index::{BuildOutcome, VectorIndex};
pub use retriever::Retriever;

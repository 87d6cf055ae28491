//! In-memory, write-once vector index.
//!
//! The index is filled by exactly one successful [`VectorIndex::build`] and is
//! read-only afterwards, so queries need no locking. Concurrent builds are
//! serialized by the `OnceCell`: late callers wait for the running build and
//! then observe its result. A failed build leaves the cell empty.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use tokio::sync::OnceCell;
use tracing::{debug, info};

use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, ChunkId, EmbeddingVector, QueryResult, ScoredChunk};
use docqa_core::{Error, ProviderFailure, Result};

use crate::distance::{cosine_with_norms, norm};

struct Entry {
    id: ChunkId,
    text: String,
    vector: EmbeddingVector,
    norm: f32,
}

struct Entries {
    rows: Vec<Entry>,
    dimension: usize,
    embedder_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// This call embedded and stored the chunks.
    Built { entries: usize },
    /// The index was already populated; nothing was called.
    AlreadyBuilt { entries: usize },
}

#[derive(Default)]
pub struct VectorIndex {
    entries: OnceCell<Entries>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.entries.initialized()
    }

    pub fn len(&self) -> usize {
        self.entries.get().map_or(0, |e| e.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> Option<usize> {
        self.entries.get().map(|e| e.dimension)
    }

    pub fn embedder_id(&self) -> Option<&str> {
        self.entries.get().map(|e| e.embedder_id.as_str())
    }

    /// Stored vector for a chunk id.
    pub fn vector(&self, id: &str) -> Option<&[f32]> {
        self.entries.get()?.rows.iter().find(|r| r.id == id).map(|r| r.vector.as_slice())
    }

    /// Embed all chunks with a single batch call and store them.
    pub async fn build(&self, chunks: &[Chunk], embedder: &dyn Embedder) -> Result<BuildOutcome> {
        let ran = AtomicBool::new(false);
        let ran_ref = &ran;
        let entries = self
            .entries
            .get_or_try_init(|| async move {
                ran_ref.store(true, AtomicOrdering::SeqCst);
                embed_chunks(chunks, embedder).await
            })
            .await?;

        let count = entries.rows.len();
        if ran.load(AtomicOrdering::SeqCst) {
            info!(entries = count, dimension = entries.dimension, embedder = %entries.embedder_id, "vector index built");
            Ok(BuildOutcome::Built { entries: count })
        } else {
            debug!(entries = count, "vector index already built, skipping");
            Ok(BuildOutcome::AlreadyBuilt { entries: count })
        }
    }

    /// The `k` entries most cosine-similar to `vector`, most similar first.
    /// Equal scores keep insertion order.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<QueryResult> {
        let entries = self.entries.get().ok_or(Error::IndexNotBuilt)?;
        if vector.len() != entries.dimension {
            return Err(Error::DimensionMismatch { expected: entries.dimension, actual: vector.len() });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_norm = norm(vector);
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for (index, row) in entries.rows.iter().enumerate() {
            let candidate = Candidate { score: cosine_with_norms(vector, query_norm, &row.vector, row.norm), index };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| {
                let row = &entries.rows[c.index];
                ScoredChunk { id: row.id.clone(), text: row.text.clone(), score: c.score }
            })
            .collect())
    }
}

async fn embed_chunks(chunks: &[Chunk], embedder: &dyn Embedder) -> Result<Entries> {
    if chunks.is_empty() {
        return Err(Error::EmptyDocument);
    }
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != chunks.len() {
        return Err(Error::embedding(
            ProviderFailure::MalformedResponse,
            format!("embedder returned {} vectors for {} chunks", vectors.len(), chunks.len()),
        ));
    }

    let dimension = vectors.first().map_or(0, Vec::len);
    if dimension == 0 {
        return Err(Error::embedding(ProviderFailure::MalformedResponse, "embedder returned zero-length vectors"));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(Error::DimensionMismatch { expected: dimension, actual: bad.len() });
    }

    let rows = chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, vector)| Entry { id: chunk.id.clone(), text: chunk.text.clone(), norm: norm(&vector), vector })
        .collect();
    Ok(Entries { rows, dimension, embedder_id: embedder.model_id().to_string() })
}

/// Heap item ordered so that the heap's maximum is the weakest candidate:
/// lower score first, then later insertion.
struct Candidate {
    score: f32,
    index: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.total_cmp(&self.score).then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_prefers_higher_score_then_earlier_index() {
        let best = Candidate { score: 0.9, index: 5 };
        let tie_early = Candidate { score: 0.5, index: 1 };
        let tie_late = Candidate { score: 0.5, index: 2 };
        assert!(best < tie_early);
        assert!(tie_early < tie_late);
    }

    #[test]
    fn unbuilt_index_refuses_queries() {
        let index = VectorIndex::new();
        assert!(matches!(index.query(&[1.0], 3), Err(Error::IndexNotBuilt)));
        assert!(!index.is_built());
        assert_eq!(index.len(), 0);
    }
}

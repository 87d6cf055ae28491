//! Domain types shared by the chunker, the vector index and the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = String;
pub type EmbeddingVector = Vec<f32>;

/// Prefix of every chunk identifier; the suffix is the split position.
pub const CHUNK_ID_PREFIX: &str = "doc_chunk_";

pub fn chunk_id(index: usize) -> ChunkId {
    format!("{CHUNK_ID_PREFIX}{index}")
}

/// A paragraph-sized unit of the source document.
///
/// - `id`: `doc_chunk_<index>`, stable for a given document
/// - `index`: position among the non-empty segments of the split
/// - `text`: trimmed, never empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub index: usize,
    pub text: String,
}

/// One retrieved chunk. `score` is cosine similarity, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: ChunkId,
    pub text: String,
    pub score: f32,
}

/// Retrieved chunks, most similar first.
pub type QueryResult = Vec<ScoredChunk>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// A label assigned to a question by a topic classifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

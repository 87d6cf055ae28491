use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use docqa_core::config::DEFAULT_TIMEOUT_SECS;
use docqa_core::timeout::{within, Operation};
use docqa_core::traits::Embedder;
use docqa_core::types::QueryResult;
use docqa_core::{Error, Result};

use crate::index::VectorIndex;

/// Embeds a question and returns the closest chunks from a built index.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    top_k: usize,
    timeout: Duration,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self { embedder, index, top_k, timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Chunk texts, most relevant first. Fewer than `top_k` when the index is small.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        Ok(self.retrieve_scored(question).await?.into_iter().map(|c| c.text).collect())
    }

    pub async fn retrieve_scored(&self, question: &str) -> Result<QueryResult> {
        // Don't spend an embedding call on an index that can't answer.
        if !self.index.is_built() {
            return Err(Error::IndexNotBuilt);
        }
        let vector = within(self.timeout, Operation::Embedding, self.embedder.embed_one(question)).await?;
        let hits = self.index.query(&vector, self.top_k)?;
        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "retrieved context"
        );
        Ok(hits)
    }
}

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::{Error, ProviderFailure, Result};
use crate::types::{EmbeddingVector, Topic};

/// Turns text into fixed-dimension vectors.
///
/// `embed_batch` must be order-preserving and return exactly one vector per
/// input. Failures are reported as `Error::EmbeddingProvider`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier of the model behind this embedder.
    fn model_id(&self) -> &str;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(Error::embedding(
                ProviderFailure::MalformedResponse,
                format!("expected 1 vector for a single input, got {}", vectors.len()),
            ));
        }
        Ok(vectors.remove(0))
    }
}

/// A chat-completion model taking a system instruction and a user prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn model_id(&self) -> &str;

    async fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String>;
}

/// Assigns zero or more topics to a piece of text.
pub trait TopicClassifier: Send + Sync {
    fn classify(&self, text: &str) -> BTreeSet<Topic>;

    /// Every topic this classifier can return, for seeding a zeroed tally.
    fn topics(&self) -> Vec<Topic> {
        Vec::new()
    }
}

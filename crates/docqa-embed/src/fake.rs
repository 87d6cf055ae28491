use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use twox_hash::XxHash64;

use docqa_core::traits::Embedder;
use docqa_core::types::EmbeddingVector;
use docqa_core::Result;

pub const FAKE_EMBEDDING_DIM: usize = 1024;

/// Deterministic hashed bag-of-words embedder for tests and offline runs.
///
/// Tokens are lowercased and stripped of punctuation, so "¿Seguridad?" and
/// "seguridad" land in the same bucket. Vectors are L2-normalized.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1), id: format!("fake-xxhash:d{}", dim.max(1)) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed_text(&self, text: &str) -> EmbeddingVector {
        let mut v = vec![0f32; self.dim];
        for token in tokens(text) {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = usize::try_from(h % self.dim as u64).unwrap_or(0);
            v[idx] += 0.5 + f32::from(u16::try_from(h >> 48).unwrap_or(0)) / f32::from(u16::MAX) * 0.5;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self::new(FAKE_EMBEDDING_DIM)
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|t| t.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect::<String>())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_case_are_ignored() {
        let e = FakeEmbedder::new(64);
        assert_eq!(e.embed_text("¿Seguridad?"), e.embed_text("seguridad"));
    }

    #[test]
    fn empty_text_is_a_zero_vector() {
        let e = FakeEmbedder::new(8);
        assert!(e.embed_text("  ¿? ").iter().all(|x| *x == 0.0));
    }
}

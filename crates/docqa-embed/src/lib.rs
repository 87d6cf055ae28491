//! docqa-embed
//!
//! Embedder implementations: the OpenAI-compatible HTTP client used in
//! production and a deterministic hashed embedder for tests and offline demos.

use std::sync::Arc;

use tracing::info;

use docqa_core::config::ProviderConfig;
use docqa_core::traits::Embedder;
use docqa_core::Result;

mod fake;
mod openai;

pub use fake::{FakeEmbedder, FAKE_EMBEDDING_DIM};
pub use openai::OpenAiEmbedder;

/// `APP_USE_FAKE_EMBEDDINGS=1` (or `true`) swaps in [`FakeEmbedder`].
pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn get_default_embedder(model: &str, provider: &ProviderConfig) -> Result<Arc<dyn Embedder>> {
    if use_fake_embeddings() {
        info!(dim = FAKE_EMBEDDING_DIM, "using fake embedder");
        return Ok(Arc::new(FakeEmbedder::default()));
    }
    let embedder = OpenAiEmbedder::new(model, provider)?;
    info!(model, url = embedder.url(), "using OpenAI-compatible embedder");
    Ok(Arc::new(embedder))
}

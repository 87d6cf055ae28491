//! OpenAI-compatible embedding client.
//!
//! - Endpoint: `POST {base_url}/embeddings`
//! - Body: `{ model, input: [..], encoding_format: "float" }`
//! - Response: `{ data: [{ embedding, index }] }`
//!
//! Works against any server speaking the same API (vLLM, LiteLLM, Ollama's
//! OpenAI shim) through `provider.base_url`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::ProviderConfig;
use docqa_core::http::{build_client, endpoint, read_json, HttpFailure, CONTENT_TYPE_JSON};
use docqa_core::traits::Embedder;
use docqa_core::types::EmbeddingVector;
use docqa_core::{Error, ProviderFailure, Result};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'static str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(model: impl Into<String>, provider: &ProviderConfig) -> Result<Self> {
        let client = build_client(provider.timeout()).map_err(|f| f.into_embedding())?;
        Ok(Self {
            client,
            url: endpoint(&provider.base_url, "embeddings"),
            api_key: provider.api_key.clone(),
            model: model.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");

        let body = EmbeddingRequest { model: &self.model, input: texts, encoding_format: "float" };
        let mut request = self.client.post(&self.url).header("Content-Type", CONTENT_TYPE_JSON).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|e| HttpFailure::from(e).into_embedding())?;
        let parsed: EmbeddingResponse = read_json("embeddings", response).await.map_err(|f| f.into_embedding())?;

        if parsed.data.len() != texts.len() {
            return Err(Error::embedding(
                ProviderFailure::MalformedResponse,
                format!("expected {} embeddings, got {}", texts.len(), parsed.data.len()),
            ));
        }
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        if data.iter().enumerate().any(|(i, d)| d.index != i) {
            return Err(Error::embedding(ProviderFailure::MalformedResponse, "embedding indices are not 0..n"));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

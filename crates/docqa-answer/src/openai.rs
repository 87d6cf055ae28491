//! OpenAI-compatible chat completion client.
//!
//! - Endpoint: `POST {base_url}/chat/completions`
//! - Body: `{ model, messages: [system, user] }`
//! - Response: `{ choices: [{ message: { content } }] }`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::ProviderConfig;
use docqa_core::http::{build_client, endpoint, read_json, HttpFailure, CONTENT_TYPE_JSON};
use docqa_core::traits::CompletionProvider;
use docqa_core::{Error, ProviderFailure, Result};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiChat {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChat {
    pub fn new(model: impl Into<String>, provider: &ProviderConfig) -> Result<Self> {
        let client = build_client(provider.timeout()).map_err(|f| f.into_completion())?;
        Ok(Self {
            client,
            url: endpoint(&provider.base_url, "chat/completions"),
            api_key: provider.api_key.clone(),
            model: model.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiChat {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_chars = user_prompt.len(), "requesting completion");

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_instruction },
                ChatMessage { role: "user", content: user_prompt },
            ],
        };
        let mut request = self.client.post(&self.url).header("Content-Type", CONTENT_TYPE_JSON).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await.map_err(|e| HttpFailure::from(e).into_completion())?;
        let parsed: ChatResponse = read_json("chat/completions", response).await.map_err(|f| f.into_completion())?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::completion(ProviderFailure::MalformedResponse, "response has no message content"))
    }
}

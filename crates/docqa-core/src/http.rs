//! Shared plumbing for the OpenAI-compatible HTTP providers.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, ProviderFailure};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A failed provider round-trip, not yet attributed to a provider kind.
#[derive(Debug)]
pub struct HttpFailure {
    pub kind: ProviderFailure,
    pub message: String,
}

impl HttpFailure {
    pub fn into_embedding(self) -> Error {
        Error::embedding(self.kind, self.message)
    }

    pub fn into_completion(self) -> Error {
        Error::completion(self.kind, self.message)
    }
}

impl From<reqwest::Error> for HttpFailure {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            ProviderFailure::Timeout
        } else if e.is_decode() {
            ProviderFailure::MalformedResponse
        } else {
            ProviderFailure::Network
        };
        Self { kind, message: e.to_string() }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, HttpFailure> {
    reqwest::Client::builder().timeout(timeout).build().map_err(HttpFailure::from)
}

/// Join a base URL such as `https://api.openai.com/v1` with an endpoint path.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Check the status and decode the body, classifying every failure.
pub async fn read_json<T: DeserializeOwned>(provider: &str, response: reqwest::Response) -> Result<T, HttpFailure> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|env| env.error)
            .and_then(|d| d.message)
            .unwrap_or(body);
        return Err(HttpFailure {
            kind: ProviderFailure::from_status(status.as_u16()),
            message: format!("{provider} returned HTTP {}: {detail}", status.as_u16()),
        });
    }
    serde_json::from_str(&body).map_err(|e| HttpFailure {
        kind: ProviderFailure::MalformedResponse,
        message: format!("{provider} response could not be decoded: {e}"),
    })
}

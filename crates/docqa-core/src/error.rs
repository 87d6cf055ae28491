use std::fmt;

use thiserror::Error;

/// Why a call to an external provider failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    Network,
    Auth,
    RateLimited,
    Timeout,
    MalformedResponse,
    Upstream,
}

impl ProviderFailure {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimited,
            408 | 504 => Self::Timeout,
            _ => Self::Upstream,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::RateLimited => "rate limited",
            Self::Timeout => "timeout",
            Self::MalformedResponse => "malformed response",
            Self::Upstream => "upstream",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Document produced no chunks to index")]
    EmptyDocument,

    #[error("Embedding provider failed ({kind}): {message}")]
    EmbeddingProvider { kind: ProviderFailure, message: String },

    #[error("Completion provider failed ({kind}): {message}")]
    CompletionProvider { kind: ProviderFailure, message: String },

    #[error("Vector index queried before it was built")]
    IndexNotBuilt,

    #[error("Pipeline is not ready; build it before answering")]
    NotReady,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn embedding(kind: ProviderFailure, message: impl Into<String>) -> Self {
        Self::EmbeddingProvider { kind, message: message.into() }
    }

    pub fn completion(kind: ProviderFailure, message: impl Into<String>) -> Self {
        Self::CompletionProvider { kind, message: message.into() }
    }

    /// Errors that must abort startup or the current session rather than be
    /// converted into a displayable message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyDocument | Self::DimensionMismatch { .. } | Self::InvalidConfig(_) | Self::Io(_)
        )
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Self::EmbeddingProvider { .. } | Self::CompletionProvider { .. })
    }

    pub fn provider_failure(&self) -> Option<ProviderFailure> {
        match self {
            Self::EmbeddingProvider { kind, .. } | Self::CompletionProvider { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

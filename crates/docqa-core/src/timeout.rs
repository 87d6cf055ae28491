use std::future::Future;
use std::time::Duration;

use crate::error::{Error, ProviderFailure, Result};

/// Which provider a deadline applies to; decides the error variant on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Embedding,
    Completion,
}

impl Operation {
    fn timed_out(self, limit: Duration) -> Error {
        let message = format!("no response within {limit:?}");
        match self {
            Self::Embedding => Error::embedding(ProviderFailure::Timeout, message),
            Self::Completion => Error::completion(ProviderFailure::Timeout, message),
        }
    }
}

/// Run a provider call under a deadline. The call is dropped (cancelled) when
/// the deadline passes.
pub async fn within<T, F>(limit: Duration, operation: Operation, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(operation.timed_out(limit)),
    }
}

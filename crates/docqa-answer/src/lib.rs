//! docqa-answer
//!
//! Prompt assembly and completion providers: the grounded [`AnswerComposer`],
//! the OpenAI-compatible chat client and an offline extractive stand-in.

use std::sync::Arc;

use tracing::info;

use docqa_core::config::ProviderConfig;
use docqa_core::traits::CompletionProvider;
use docqa_core::Result;

mod composer;
mod offline;
mod openai;

pub use composer::{AnswerComposer, ANSWER_CUE, CONTEXT_FENCE, CONTEXT_SEPARATOR, QUESTION_LABEL};
pub use offline::ExtractiveCompletion;
pub use openai::OpenAiChat;

/// `APP_USE_FAKE_COMPLETIONS=1` (or `true`) swaps in [`ExtractiveCompletion`].
pub fn use_fake_completions() -> bool {
    std::env::var("APP_USE_FAKE_COMPLETIONS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn get_default_completion(
    model: &str,
    provider: &ProviderConfig,
    refusal_sentence: &str,
) -> Result<Arc<dyn CompletionProvider>> {
    if use_fake_completions() {
        info!("using offline extractive completion");
        return Ok(Arc::new(ExtractiveCompletion::new(refusal_sentence)));
    }
    let chat = OpenAiChat::new(model, provider)?;
    info!(model, url = chat.url(), "using OpenAI-compatible chat completion");
    Ok(Arc::new(chat))
}

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use docqa_core::config::{PipelineConfig, DEFAULT_TIMEOUT_SECS};
use docqa_core::timeout::{within, Operation};
use docqa_core::traits::CompletionProvider;
use docqa_core::Result;

/// Separator between retrieved chunks inside the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";
/// Line fencing the context block on both sides.
pub const CONTEXT_FENCE: &str = "---";
pub const QUESTION_LABEL: &str = "PREGUNTA:";
pub const ANSWER_CUE: &str = "RESPUESTA:";

/// Builds the grounded prompt for a question and asks the completion model.
pub struct AnswerComposer {
    provider: Arc<dyn CompletionProvider>,
    system_persona: String,
    grounding_preamble: String,
    refusal_sentence: String,
    timeout: Duration,
}

impl AnswerComposer {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            system_persona: config.system_persona.clone(),
            grounding_preamble: config.grounding_preamble.clone(),
            refusal_sentence: config.refusal_sentence.clone(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_persona
    }

    pub fn refusal_sentence(&self) -> &str {
        &self.refusal_sentence
    }

    /// The user prompt: preamble, fenced context, quoted question, the
    /// literal refusal instruction and the answer cue.
    pub fn build_prompt(&self, question: &str, context_chunks: &[String]) -> String {
        let context = context_chunks.join(CONTEXT_SEPARATOR);
        format!(
            "{preamble}\n{fence}\n{context}\n{fence}\n{QUESTION_LABEL} \"{question}\"\n\
             Si la información no es suficiente para responder, di EXACTAMENTE: \"{refusal}\"\n\
             {ANSWER_CUE}",
            preamble = self.grounding_preamble,
            fence = CONTEXT_FENCE,
            refusal = self.refusal_sentence,
        )
    }

    /// Ask the model and return its text untouched.
    ///
    /// With no usable context there is nothing to ground an answer on, so the
    /// refusal sentence is returned without a provider call.
    pub async fn compose(&self, question: &str, context_chunks: &[String]) -> Result<String> {
        if context_chunks.iter().all(|c| c.trim().is_empty()) {
            debug!("empty context, answering with the refusal sentence");
            return Ok(self.refusal_sentence.clone());
        }

        let prompt = self.build_prompt(question, context_chunks);
        let answer = within(
            self.timeout,
            Operation::Completion,
            self.provider.complete(&self.system_persona, &prompt),
        )
        .await?;
        debug!(model = self.provider.model_id(), answer_chars = answer.len(), "completion received");
        Ok(answer)
    }
}

//! Offline completion provider.
//!
//! Reads the fenced context and the question back out of the grounded prompt
//! and answers with the context sentence sharing the most words with the
//! question. No overlap means no grounded answer, so it refuses. Useful for
//! demos without network access and for deterministic tests.

use std::collections::HashSet;

use async_trait::async_trait;

use docqa_core::traits::CompletionProvider;
use docqa_core::Result;

use crate::composer::{CONTEXT_FENCE, QUESTION_LABEL};

/// Words shorter than this are mostly articles and prepositions.
const MIN_WORD_CHARS: usize = 4;
/// Words are compared on this many leading characters, so "empleo" matches "empleos".
const STEM_CHARS: usize = 6;

pub struct ExtractiveCompletion {
    refusal_sentence: String,
}

impl ExtractiveCompletion {
    pub fn new(refusal_sentence: impl Into<String>) -> Self {
        Self { refusal_sentence: refusal_sentence.into() }
    }

    pub fn answer(&self, user_prompt: &str) -> String {
        let (context, question) = split_prompt(user_prompt);
        let wanted = stems(question);
        if wanted.is_empty() {
            return self.refusal_sentence.clone();
        }

        let mut best: Option<(usize, &str)> = None;
        for sentence in sentences(context) {
            let overlap = stems(sentence).intersection(&wanted).count();
            if overlap > 0 && best.map_or(true, |(score, _)| overlap > score) {
                best = Some((overlap, sentence));
            }
        }
        match best {
            Some((_, sentence)) => sentence.to_string(),
            None => self.refusal_sentence.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for ExtractiveCompletion {
    fn model_id(&self) -> &str {
        "extractive-offline"
    }

    async fn complete(&self, _system_instruction: &str, user_prompt: &str) -> Result<String> {
        Ok(self.answer(user_prompt))
    }
}

/// Context between the first two fence lines, and the quoted question.
fn split_prompt(prompt: &str) -> (&str, &str) {
    let mut context = "";
    let fence_line = format!("\n{CONTEXT_FENCE}\n");
    let mut fences = prompt.match_indices(fence_line.as_str());
    if let (Some((open, _)), Some((close, _))) = (fences.next(), fences.next()) {
        let start = open + CONTEXT_FENCE.len() + 2;
        if start <= close {
            context = &prompt[start..close];
        }
    }

    let question = prompt
        .lines()
        .find_map(|line| line.strip_prefix(QUESTION_LABEL))
        .map(|q| q.trim().trim_matches('"'))
        .unwrap_or("");
    (context, question)
}

fn sentences(context: &str) -> impl Iterator<Item = &str> {
    context.split_inclusive(['.', '!', '?', '\n']).map(str::trim).filter(|s| !s.is_empty())
}

fn stems(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .map(|w| w.to_lowercase().chars().take(STEM_CHARS).collect())
        .collect()
}

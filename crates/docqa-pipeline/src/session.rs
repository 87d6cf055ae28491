use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use docqa_core::refusal::is_refusal;
use docqa_core::types::{ConversationTurn, Topic};

/// Per-conversation bookkeeping, owned by the caller.
///
/// History is append-only. The topic tally counts questions per topic (a
/// question may count for several topics). Questions answered with the
/// refusal sentence are kept as unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    history: Vec<ConversationTurn>,
    topic_tally: BTreeMap<Topic, usize>,
    unanswered: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with every known topic at zero so the tally lists them all.
    pub fn with_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self { topic_tally: topics.into_iter().map(|t| (t, 0)).collect(), ..Self::default() }
    }

    pub fn record(&mut self, question: &str, answer: &str, topics: &BTreeSet<Topic>, refusal_marker: &str) {
        self.history.push(ConversationTurn { question: question.to_string(), answer: answer.to_string() });
        for topic in topics {
            *self.topic_tally.entry(topic.clone()).or_insert(0) += 1;
        }
        if is_refusal(answer, refusal_marker) {
            self.unanswered.push(question.to_string());
        }
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn topic_tally(&self) -> &BTreeMap<Topic, usize> {
        &self.topic_tally
    }

    pub fn unanswered(&self) -> &[String] {
        &self.unanswered
    }

    pub fn total_mentions(&self) -> usize {
        self.topic_tally.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::refusal::{REFUSAL_MARKER, REFUSAL_SENTENCE};

    #[test]
    fn records_turns_tallies_and_refusals() {
        let mut s = Session::with_topics([Topic::new("Seguridad"), Topic::new("Empleo")]);
        let seguridad = BTreeSet::from([Topic::new("Seguridad")]);

        s.record("¿Drones?", "Javier apoya drones.", &seguridad, REFUSAL_MARKER);
        s.record("¿Y la luna?", REFUSAL_SENTENCE, &BTreeSet::new(), REFUSAL_MARKER);
        s.record("¿Más policía?", "Sí.", &seguridad, REFUSAL_MARKER);

        let questions: Vec<_> = s.history().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, ["¿Drones?", "¿Y la luna?", "¿Más policía?"]);
        assert_eq!(s.topic_tally()[&Topic::new("Seguridad")], 2);
        assert_eq!(s.topic_tally()[&Topic::new("Empleo")], 0);
        assert_eq!(s.unanswered(), ["¿Y la luna?"]);
        assert_eq!(s.total_mentions(), 2);
    }
}

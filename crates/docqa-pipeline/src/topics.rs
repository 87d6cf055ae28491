use std::collections::{BTreeMap, BTreeSet};

use docqa_core::config::default_topics;
use docqa_core::traits::TopicClassifier;
use docqa_core::types::Topic;

/// Tags text with every topic whose keyword list has a case-insensitive
/// substring hit.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    table: Vec<(Topic, Vec<String>)>,
}

impl KeywordClassifier {
    pub fn new(table: &BTreeMap<String, Vec<String>>) -> Self {
        let table = table
            .iter()
            .map(|(name, words)| {
                let words = words.iter().map(|w| w.trim().to_lowercase()).filter(|w| !w.is_empty()).collect();
                (Topic::new(name.clone()), words)
            })
            .collect();
        Self { table }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(&default_topics())
    }
}

impl TopicClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> BTreeSet<Topic> {
        let text = text.to_lowercase();
        self.table
            .iter()
            .filter(|(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    fn topics(&self) -> Vec<Topic> {
        self.table.iter().map(|(topic, _)| topic.clone()).collect()
    }
}

//! Emotion classifier: maps free text onto a closed emotion vocabulary.
//!
//! Ordered keyword sets, case-insensitive, whole words only. The first category with a hit
//! wins; no hit yields `Neutral`. Keyword sets are small English word lists; a different
//! implementation can be dropped in behind [`Classify`].

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detected emotional tone of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Sad,
    Excited,
    Happy,
    Anxious,
    #[default]
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Angry,
        Emotion::Sad,
        Emotion::Excited,
        Emotion::Happy,
        Emotion::Anxious,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Sad => "sad",
            Emotion::Excited => "excited",
            Emotion::Happy => "happy",
            Emotion::Anxious => "anxious",
            Emotion::Neutral => "neutral",
        }
    }

    /// Keywords for this category, in no particular order. `Neutral` has none.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Emotion::Angry => &["angry", "mad", "furious", "frustrated"],
            Emotion::Sad => &["sad", "depressed", "crying", "heartbroken"],
            Emotion::Excited => &["excited", "thrilled", "fantastic", "awesome"],
            Emotion::Happy => &["happy", "joy", "pleased", "delighted"],
            Emotion::Anxious => &["anxious", "worried", "nervous", "panic"],
            Emotion::Neutral => &[],
        }
    }
}

/// Pluggable classification contract. Implementations must be total and deterministic.
pub trait Classify: Send + Sync {
    fn classify(&self, text: &str) -> Emotion;
}

/// Whole-word, case-insensitive alternation over a fixed word list.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    /// `None` when the list is empty; matches nothing.
    pattern: Option<Regex>,
}

impl KeywordSet {
    pub fn new(words: &[&str]) -> Self {
        if words.is_empty() {
            return Self { pattern: None };
        }
        let alternation = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            pattern: Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).ok(),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Default keyword classifier. Build once and share by reference.
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    rules: Vec<(Emotion, KeywordSet)>,
}

impl EmotionClassifier {
    pub fn new() -> Self {
        let rules = Emotion::ALL
            .iter()
            .filter(|e| !e.keywords().is_empty())
            .map(|e| (*e, KeywordSet::new(e.keywords())))
            .collect();
        Self { rules }
    }
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for EmotionClassifier {
    fn classify(&self, text: &str) -> Emotion {
        self.rules
            .iter()
            .find(|(_, set)| set.is_match(text))
            .map(|(emotion, _)| *emotion)
            .unwrap_or(Emotion::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unmatched_text_is_neutral() {
        let c = EmotionClassifier::new();
        assert_eq!(c.classify(""), Emotion::Neutral);
        assert_eq!(c.classify("Tell me about the weather"), Emotion::Neutral);
    }

    #[test]
    fn matches_whole_words_case_insensitively() {
        let c = EmotionClassifier::new();
        assert_eq!(c.classify("I am SO Frustrated with this"), Emotion::Angry);
        assert_eq!(c.classify("feeling nervous about tomorrow"), Emotion::Anxious);
        // "madness" and "joyful" are not whole-word hits
        assert_eq!(c.classify("this madness is joyful"), Emotion::Neutral);
    }

    #[test]
    fn first_category_in_order_wins() {
        let c = EmotionClassifier::new();
        // angry precedes happy in the rule order
        assert_eq!(c.classify("happy but also mad"), Emotion::Angry);
        // sad precedes anxious
        assert_eq!(c.classify("worried and sad"), Emotion::Sad);
        // excited precedes happy
        assert_eq!(c.classify("happy and thrilled"), Emotion::Excited);
    }

    #[test]
    fn emotion_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Emotion::Anxious).unwrap(), "\"anxious\"");
    }
}

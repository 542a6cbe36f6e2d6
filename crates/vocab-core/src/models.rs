//! Data models for the vocabulary games.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifiers.
pub type ItemId = String;
pub type SessionId = Uuid;

/// Blank marker used inside prompt sentences.
pub const BLANK: &str = "_____";

/// Item difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    /// Unique identifier.
    pub id: ItemId,
    /// The word being learned.
    pub word: String,
    /// Translation into the learner's language.
    pub translation: String,
    /// Meaning of the word.
    pub definition: String,
    /// Pronunciation guide, e.g. IPA.
    pub pronunciation_guide: String,
    pub difficulty: Difficulty,
    /// Free-form category.
    pub category: String,
    /// Optional usage example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// Sentence with a blank for the quiz.
    pub prompt_sentence: String,
    /// Candidate answers, including `word`.
    pub options: Vec<String>,
    /// Why the correct answer fits.
    pub correct_explanation: String,
    /// Why each wrong option does not fit.
    #[serde(default)]
    pub incorrect_explanations: HashMap<String, String>,
}

impl VocabularyItem {
    /// Create an item with the given id and word. Options default to the word alone.
    pub fn new(id: impl Into<String>, word: impl Into<String>) -> Self {
        let word = word.into();
        Self {
            id: id.into(),
            prompt_sentence: BLANK.to_string(),
            options: vec![word.clone()],
            word,
            translation: String::new(),
            definition: String::new(),
            pronunciation_guide: String::new(),
            difficulty: Difficulty::Medium,
            category: String::new(),
            example: None,
            correct_explanation: String::new(),
            incorrect_explanations: HashMap::new(),
        }
    }

    /// Set translation.
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }

    /// Set definition.
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = definition.into();
        self
    }

    /// Set difficulty.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the quiz prompt and the wrong options with their explanations.
    pub fn with_quiz(
        mut self,
        prompt: impl Into<String>,
        distractors: &[(&str, &str)],
        correct_explanation: impl Into<String>,
    ) -> Self {
        self.prompt_sentence = prompt.into();
        self.correct_explanation = correct_explanation.into();
        self.options = vec![self.word.clone()];
        for (option, why) in distractors {
            self.options.push(option.to_string());
            self.incorrect_explanations
                .insert(option.to_string(), why.to_string());
        }
        self
    }

    /// Number of times `word` appears in `options`.
    pub fn word_occurrences(&self) -> usize {
        self.options.iter().filter(|o| **o == self.word).count()
    }
}

/// Game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Quiz,
    Flashcard,
}

impl GameType {
    /// Storage prefix for this game.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Flashcard => "flashcard",
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quiz => "Quiz",
            Self::Flashcard => "Flashcards",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archived record of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: SessionId,
    pub game_type: GameType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub score: u32,
    pub total_questions: usize,
    /// Distinct questions answered.
    pub answered_questions: usize,
    pub correct_answers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl GameSession {
    /// Wall-clock length of the session in seconds.
    pub fn duration_secs(&self) -> f64 {
        let millis = self
            .end_time
            .signed_duration_since(self.start_time)
            .num_milliseconds()
            .max(0);
        millis as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_shape() {
        let json = r#"{
            "id": "v1",
            "word": "ephemeral",
            "translation": "ulotny",
            "definition": "lasting a very short time",
            "pronunciationGuide": "/ɪˈfem.ər.əl/",
            "difficulty": "hard",
            "category": "adjectives",
            "promptSentence": "Fame in the age of social media is often _____.",
            "options": ["ephemeral", "eternal", "robust"],
            "correctExplanation": "Ephemeral means short-lived.",
            "incorrectExplanations": {"eternal": "Opposite meaning."}
        }"#;
        let item: VocabularyItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.difficulty, Difficulty::Hard);
        assert_eq!(item.example, None);
        assert_eq!(item.word_occurrences(), 1);
        assert_eq!(item.incorrect_explanations.len(), 1);
    }

    #[test]
    fn test_with_quiz_keeps_word_once() {
        let item = VocabularyItem::new("a", "apple").with_quiz(
            "An _____ a day.",
            &[("pear", "Not the idiom."), ("plum", "Not the idiom.")],
            "The idiom uses apple.",
        );
        assert_eq!(item.options, vec!["apple", "pear", "plum"]);
        assert_eq!(item.word_occurrences(), 1);
    }

    #[test]
    fn test_game_type_display() {
        assert_eq!(GameType::Quiz.to_string(), "quiz");
        assert_eq!(GameType::Flashcard.to_string(), "flashcard");
    }
}

//! Multiple-choice quiz rules.

use crate::models::{VocabularyItem, BLANK};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shown when a wrong option has no explanation of its own.
pub const FALLBACK_EXPLANATION: &str = "This word does not fit the context of the sentence.";

/// Points awarded per answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScoring {
    pub correct_points: u32,
    /// Subtracted on a wrong answer; the session score floors at zero.
    pub incorrect_penalty: u32,
}

impl Default for QuizScoring {
    fn default() -> Self {
        Self {
            correct_points: 100,
            incorrect_penalty: 25,
        }
    }
}

impl QuizScoring {
    /// Signed score change for an answer.
    pub fn delta(&self, is_correct: bool) -> i32 {
        let points = if is_correct {
            self.correct_points
        } else {
            self.incorrect_penalty
        };
        let points = i32::try_from(points).unwrap_or(i32::MAX);
        if is_correct {
            points
        } else {
            -points
        }
    }
}

/// Result of answering a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub selected: String,
    pub is_correct: bool,
    pub correct_word: String,
    pub correct_explanation: String,
    /// Why the selected option is wrong; `None` when it was correct.
    pub incorrect_explanation: Option<String>,
}

/// A catalog item presented as a question, with its options shuffled once.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    item: VocabularyItem,
    options: Vec<String>,
}

impl QuizQuestion {
    pub fn new<R: Rng + ?Sized>(item: &VocabularyItem, rng: &mut R) -> Self {
        let mut options = item.options.clone();
        options.shuffle(rng);
        Self {
            item: item.clone(),
            options,
        }
    }

    pub fn item(&self) -> &VocabularyItem {
        &self.item
    }

    /// Options in display order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Prompt sentence with the blank widened for display.
    pub fn prompt(&self) -> String {
        self.item.prompt_sentence.replacen(BLANK, "______", 1)
    }

    pub fn check(&self, answer: &str) -> AnswerFeedback {
        let is_correct = answer == self.item.word;
        let incorrect_explanation = (!is_correct).then(|| {
            self.item
                .incorrect_explanations
                .get(answer)
                .filter(|why| !why.trim().is_empty())
                .cloned()
                .unwrap_or_else(|| FALLBACK_EXPLANATION.to_string())
        });
        AnswerFeedback {
            selected: answer.to_string(),
            is_correct,
            correct_word: self.item.word.clone(),
            correct_explanation: self.item.correct_explanation.clone(),
            incorrect_explanation,
        }
    }
}

//! Cumulative user statistics.

use crate::error::StorageResult;
use crate::models::{GameSession, GameType};
use crate::storage::{keys, read_json, write_json, Storage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Quiz totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizStats {
    /// Questions answered across all quiz sessions.
    pub total_questions: usize,
    pub correct_answers: usize,
    /// Mean seconds per answered question.
    pub average_time_per_question: f64,
}

impl QuizStats {
    /// Correct answers as a percentage of answered questions.
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct_answers, self.total_questions)
    }
}

/// Flashcard totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlashcardStats {
    /// Cards marked known or unknown across all sessions.
    pub total_cards: usize,
    pub known_cards: usize,
}

impl FlashcardStats {
    /// Known cards as a percentage of reviewed cards.
    pub fn mastery_percentage(&self) -> f64 {
        percentage(self.known_cards, self.total_cards)
    }
}

/// Aggregate over every completed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_games_played: u32,
    pub total_score: u64,
    pub quiz_stats: QuizStats,
    pub flashcard_stats: FlashcardStats,
    /// Consecutive days with at least one completed session.
    pub streak_days: u32,
    pub last_played_date: Option<NaiveDate>,
}

impl UserStats {
    pub fn average_score(&self) -> f64 {
        if self.total_games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.total_games_played)
        }
    }

    /// Read stored stats; missing or corrupt values give zeroed stats.
    pub fn load(storage: &dyn Storage) -> StorageResult<Self> {
        Ok(read_json(storage, keys::USER_STATS)?.unwrap_or_default())
    }

    pub fn save(&self, storage: &dyn Storage) -> StorageResult<()> {
        write_json(storage, keys::USER_STATS, self)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Folds completed sessions into [`UserStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator;

impl StatsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Stats after adding one completed session played on `today`.
    pub fn record_session(&self, stats: &UserStats, session: &GameSession, today: NaiveDate) -> UserStats {
        let mut next = stats.clone();
        next.total_games_played += 1;
        next.total_score += u64::from(session.score);

        match session.game_type {
            GameType::Quiz => {
                let quiz = &mut next.quiz_stats;
                let answered = session.answered_questions;
                if answered > 0 {
                    let previous = quiz.total_questions;
                    let elapsed = quiz.average_time_per_question * previous as f64 + session.duration_secs();
                    quiz.average_time_per_question = elapsed / (previous + answered) as f64;
                }
                quiz.total_questions += answered;
                quiz.correct_answers += session.correct_answers;
            }
            GameType::Flashcard => {
                next.flashcard_stats.total_cards += session.answered_questions;
                next.flashcard_stats.known_cards += session.correct_answers;
            }
        }

        next.streak_days = match stats.last_played_date {
            Some(last) if last == today => stats.streak_days.max(1),
            Some(last) if last.succ_opt() == Some(today) => stats.streak_days + 1,
            _ => 1,
        };
        next.last_played_date = Some(today);
        next
    }
}

/// Previously completed sessions, oldest first.
pub fn load_sessions(storage: &dyn Storage) -> StorageResult<Vec<GameSession>> {
    Ok(read_json(storage, keys::GAME_SESSIONS)?.unwrap_or_default())
}

/// Append a completed session to the stored list.
pub fn append_session(storage: &dyn Storage, session: &GameSession) -> StorageResult<()> {
    let mut sessions = load_sessions(storage)?;
    sessions.push(session.clone());
    write_json(storage, keys::GAME_SESSIONS, &sessions)
}

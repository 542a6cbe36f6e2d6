//! Engine for vocabulary learning games.
//!
//! This crate provides the non-UI parts of the trainer:
//! - A read-only vocabulary catalog loaded from JSON
//! - Random next-item selection that avoids recently shown items
//! - A per-game session state machine persisted on every change
//! - Cumulative statistics folded from completed sessions
//! - Quiz and flashcard rules driven by user intents

pub mod error;
pub mod game;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod selector;
pub mod session;
pub mod speech;
pub mod stats;
pub mod storage;
pub mod vocabulary;

// Re-exports
pub use error::{
    LoadError, LoadResult, SelectError, SessionError, SessionResult, StorageError, StorageResult, VocabError,
    VocabResult,
};
pub use game::{Game, GameOptions, Intent, Outcome};
pub use models::{Difficulty, GameSession, GameType, ItemId, SessionId, VocabularyItem};
pub use progress::{FlashcardProgress, ProgressBook};
pub use quiz::{AnswerFeedback, QuizQuestion, QuizScoring, FALLBACK_EXPLANATION};
pub use selector::{select_next, RecentItemSelector, SelectionHistory, HISTORY_WINDOW};
pub use session::{PersistedSession, Rehydration, SessionPhase, SessionState};
pub use speech::{CommandSpeaker, SilentSpeaker, Speaker, SpeechRequest, Voice};
pub use stats::{append_session, load_sessions, FlashcardStats, QuizStats, StatsAggregator, UserStats};
pub use storage::{keys, read_json, write_json, MemoryStorage, SharedStorage, SqliteStorage, Storage, Stored};
pub use vocabulary::VocabularyStore;

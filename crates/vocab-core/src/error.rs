//! Error types for the vocabulary engine.

use crate::session::SessionPhase;
use thiserror::Error;

/// Errors raised while loading the vocabulary catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The catalog source could not be read.
    #[error("Failed to read vocabulary catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog is not valid JSON or does not match the item shape.
    #[error("Malformed vocabulary catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries share the same id.
    #[error("Duplicate vocabulary id: {0}")]
    DuplicateId(String),

    /// The options of an entry do not contain its word exactly once.
    #[error("Options for '{id}' must contain '{word}' exactly once (found {count})")]
    InvalidOptions {
        id: String,
        word: String,
        count: usize,
    },

    /// A required text field is empty.
    #[error("Vocabulary entry {index} has an empty '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// Errors raised by item selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Selection was requested on a catalog with no items.
    #[error("Cannot select from an empty catalog")]
    EmptyCatalog,
}

/// Errors raised by session transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The transition is not valid in the current phase.
    #[error("Cannot {operation} while session is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: SessionPhase,
    },
}

/// Errors raised by durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value exists but cannot be decoded.
    #[error("Corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

/// Any error surfaced by the engine.
#[derive(Debug, Error)]
pub enum VocabError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type LoadResult<T> = Result<T, LoadError>;
pub type SessionResult<T> = Result<T, SessionError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type VocabResult<T> = Result<T, VocabError>;

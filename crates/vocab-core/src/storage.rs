//! Durable key/value storage for game state.
//!
//! Every value is a JSON string. Readers go through [`read_json`], which
//! separates missing keys from corrupt blobs so callers can fall back to
//! defaults without failing.

use crate::error::StorageResult;
use crate::models::GameType;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

/// Storage keys.
pub mod keys {
    use super::GameType;

    pub const USER_STATS: &str = "user-stats";
    pub const GAME_SESSIONS: &str = "game-sessions";
    pub const FLASHCARD_PROGRESS: &str = "flashcard-progress";

    /// Session state for a game.
    pub fn state(game: GameType) -> String {
        format!("{game}-state")
    }

    /// Id of the item currently shown in a game.
    pub fn current_item(game: GameType) -> String {
        format!("{game}-current-item")
    }

    /// Option chosen for the current quiz question.
    pub fn current_answer(game: GameType) -> String {
        format!("{game}-current-answer")
    }

    /// Selection history for a game.
    pub fn recent_items(game: GameType) -> String {
        format!("{game}-recent-items")
    }
}

/// A string key/value store.
///
/// Methods take `&self`; backends use interior mutability so one store can
/// be shared by every component of a game through [`SharedStorage`].
pub trait Storage {
    /// Read the raw value for a key.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a raw value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Storage shared between the components of one process.
pub type SharedStorage = Rc<dyn Storage>;

/// Result of reading a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Stored<T> {
    /// The key held a valid value.
    Found(T),
    /// The key was absent.
    NotFound,
    /// The key held a value that could not be decoded. It has been discarded.
    Corrupt(String),
}

impl<T> Stored<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Corrupt(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl<T: Default> Stored<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

/// Read and decode a JSON value.
///
/// Backend failures propagate. A value that fails to decode is removed from
/// storage and reported as [`Stored::Corrupt`].
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> StorageResult<Stored<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Stored::NotFound);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Stored::Found(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding corrupt stored value");
            storage.remove(key)?;
            Ok(Stored::Corrupt(e.to_string()))
        }
    }
}

/// Encode and write a JSON value.
pub fn write_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    tracing::debug!(key, bytes = raw.len(), "write-through");
    storage.set(key, &raw)
}

/// Volatile storage for tests and for running without a data directory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.borrow().keys().cloned().collect())
    }
}

/// SQLite-backed storage.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init()?;
        Ok(storage)
    }

    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init()?;
        Ok(storage)
    }

    fn init(&self) -> StorageResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt.query_row(params![key], |row| row.get::<_, String>(0));

        match value {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }
}

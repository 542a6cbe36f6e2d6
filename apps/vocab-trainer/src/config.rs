//! Configuration for vocab trainer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vocab_core::{GameOptions, GameType, QuizScoring, Voice};

const APP_NAME: &str = "vocab-trainer";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
    #[serde(default)]
    pub flashcard: FlashcardConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(path, content)?;
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.data_dir().to_path_buf())
    }

    /// Where the SQLite database lives.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("vocab.db")))
            .unwrap_or_else(|| "vocab.db".into())
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("vocab-trainer.log")))
            .unwrap_or_else(|| "vocab-trainer.log".into())
    }

    /// Explicit catalog path, or `vocabulary.json` in the data directory.
    ///
    /// `None` means the bundled catalog is used.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.catalog.path {
            return Some(path.clone());
        }
        Self::data_dir()
            .map(|d| d.join("vocabulary.json"))
            .filter(|p| p.exists())
    }

    pub fn game_options(&self, game_type: GameType) -> GameOptions {
        let questions_per_session = match game_type {
            GameType::Quiz => self.quiz.questions_per_session,
            GameType::Flashcard => self.flashcard.cards_per_session,
        };
        GameOptions {
            scoring: QuizScoring {
                correct_points: self.quiz.correct_points,
                incorrect_penalty: self.quiz.incorrect_penalty,
            },
            questions_per_session,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog to load instead of the bundled one.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_correct_points")]
    pub correct_points: u32,
    #[serde(default = "default_incorrect_penalty")]
    pub incorrect_penalty: u32,
    /// Defaults to the catalog size.
    #[serde(default)]
    pub questions_per_session: Option<usize>,
}

fn default_correct_points() -> u32 { 100 }
fn default_incorrect_penalty() -> u32 { 25 }

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            correct_points: 100,
            incorrect_penalty: 25,
            questions_per_session: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlashcardConfig {
    #[serde(default)]
    pub cards_per_session: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub voice: Voice,
}

fn default_true() -> bool { true }
fn default_program() -> String { "espeak-ng".to_string() }

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak-ng".to_string(),
            voice: Voice::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `vocab_core=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.quiz.correct_points, 100);
        assert_eq!(config.quiz.incorrect_penalty, 25);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.voice, Voice::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [quiz]
            incorrect_penalty = 10
            questions_per_session = 5

            [storage]
            backend = "memory"

            [speech]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.quiz.correct_points, 100);
        assert_eq!(config.quiz.incorrect_penalty, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.program, "espeak-ng");

        let options = config.game_options(GameType::Quiz);
        assert_eq!(options.questions_per_session, Some(5));
        assert_eq!(options.scoring.delta(false), -10);
        assert_eq!(config.game_options(GameType::Flashcard).questions_per_session, None);
    }

    #[test]
    fn test_explicit_paths_win() {
        let mut config = Config::default();
        config.storage.path = Some("/tmp/x.db".into());
        config.catalog.path = Some("/tmp/words.json".into());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/x.db"));
        assert_eq!(config.catalog_path(), Some(PathBuf::from("/tmp/words.json")));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.quiz.correct_points, config.quiz.correct_points);
        assert_eq!(back.speech.voice, config.speech.voice);
    }
}

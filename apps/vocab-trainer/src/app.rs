//! Application state and logic.

use crate::config::{Config, StorageBackend};
use crossterm::event::{KeyCode, KeyEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;
use vocab_core::{
    load_sessions, CommandSpeaker, Game, GameSession, GameType, Intent, LoadResult, MemoryStorage, Outcome,
    SharedStorage, SilentSpeaker, Speaker, SqliteStorage, UserStats, VocabularyStore,
};

/// Catalog used when no file is configured.
const BUNDLED_CATALOG: &str = include_str!("../data/vocabulary.json");

/// Sessions listed on the stats screen.
const RECENT_SESSIONS: usize = 8;

pub struct App {
    pub config: Config,
    pub storage: SharedStorage,
    pub catalog: Option<Rc<VocabularyStore>>,
    pub load_error: Option<String>,
    pub view: View,
    pub selected_menu: usize,
    pub game: Option<Game>,
    pub last_session: Option<GameSession>,
    pub stats: UserStats,
    pub recent_sessions: Vec<GameSession>,
    pub message: Option<String>,
    pub show_help: bool,
    speaker: Box<dyn Speaker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Menu,
    Quiz,
    Flashcard,
    Stats,
    LoadError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Quiz,
    Flashcards,
    Stats,
}

impl MenuEntry {
    pub const ALL: [MenuEntry; 3] = [MenuEntry::Quiz, MenuEntry::Flashcards, MenuEntry::Stats];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Quiz => "Sentence quiz",
            Self::Flashcards => "Flashcards",
            Self::Stats => "Statistics",
        }
    }
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let storage: SharedStorage = match config.storage.backend {
            StorageBackend::Sqlite => {
                let db_path = config.db_path();
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::info!(path = %db_path.display(), "opening database");
                Rc::new(SqliteStorage::open(&db_path)?)
            }
            StorageBackend::Memory => MemoryStorage::shared(),
        };
        let speaker: Box<dyn Speaker> = if config.speech.enabled {
            Box::new(CommandSpeaker::new(&config.speech.program, config.speech.voice.clone()))
        } else {
            Box::new(SilentSpeaker)
        };
        Ok(Self::with_storage(config, storage, speaker))
    }

    pub fn with_storage(config: Config, storage: SharedStorage, speaker: Box<dyn Speaker>) -> Self {
        let mut app = Self {
            config,
            storage,
            catalog: None,
            load_error: None,
            view: View::Menu,
            selected_menu: 0,
            game: None,
            last_session: None,
            stats: UserStats::default(),
            recent_sessions: Vec::new(),
            message: None,
            show_help: false,
            speaker,
        };
        app.reload_catalog();
        app.refresh_stats();
        app
    }

    /// Load the catalog, switching to the error view on failure.
    pub fn reload_catalog(&mut self) {
        match load_catalog(&self.config) {
            Ok(store) if store.is_empty() => {
                self.catalog = None;
                self.load_error = Some("The vocabulary catalog has no entries.".to_string());
                self.view = View::LoadError;
            }
            Ok(store) => {
                self.catalog = Some(Rc::new(store));
                self.load_error = None;
                self.view = View::Menu;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load vocabulary");
                self.catalog = None;
                self.load_error = Some(e.to_string());
                self.view = View::LoadError;
            }
        }
    }

    pub fn refresh_stats(&mut self) {
        let storage = self.storage.as_ref();
        match UserStats::load(storage) {
            Ok(stats) => self.stats = stats,
            Err(e) => tracing::warn!(error = %e, "failed to read stats"),
        }
        match load_sessions(storage) {
            Ok(mut sessions) => {
                sessions.reverse();
                sessions.truncate(RECENT_SESSIONS);
                self.recent_sessions = sessions;
            }
            Err(e) => tracing::warn!(error = %e, "failed to read sessions"),
        }
    }

    pub fn can_quit(&self) -> bool {
        matches!(self.view, View::Menu | View::LoadError)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        match self.view {
            View::Menu => self.handle_menu_key(key),
            View::Quiz => self.handle_quiz_key(key),
            View::Flashcard => self.handle_flashcard_key(key),
            View::Stats => self.handle_stats_key(key),
            View::LoadError => self.handle_load_error_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected_menu = (self.selected_menu + 1).min(MenuEntry::ALL.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_menu = self.selected_menu.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.open_entry(MenuEntry::ALL[self.selected_menu]),
            KeyCode::Char('1') => self.open_entry(MenuEntry::Quiz),
            KeyCode::Char('2') => self.open_entry(MenuEntry::Flashcards),
            KeyCode::Char('3') | KeyCode::Char('s') => self.open_entry(MenuEntry::Stats),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        let Some(game) = &self.game else {
            self.view = View::Menu;
            return;
        };
        let complete = game.state().is_complete();
        let answered = game.is_answered();

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.leave_game(),
            KeyCode::Char('r') => self.dispatch(Intent::Restart),
            KeyCode::Enter if complete => self.dispatch(Intent::Restart),
            KeyCode::Char(c @ '1'..='9') if !complete && !answered => {
                let index = c as usize - '1' as usize;
                let option = game.question().and_then(|q| q.options().get(index)).cloned();
                if let Some(option) = option {
                    self.dispatch(Intent::AnswerSelected(option));
                }
            }
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Right if answered => self.dispatch(Intent::NextRequested),
            KeyCode::Char('p') => self.speak(),
            KeyCode::Char('f') => self.dispatch(Intent::Finish),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_flashcard_key(&mut self, key: KeyEvent) {
        let Some(game) = &self.game else {
            self.view = View::Menu;
            return;
        };
        let complete = game.state().is_complete();

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.leave_game(),
            KeyCode::Char('r') => self.dispatch(Intent::Restart),
            KeyCode::Enter if complete => self.dispatch(Intent::Restart),
            KeyCode::Char(' ') => self.dispatch(Intent::FlipRequested),
            KeyCode::Char('y') => self.dispatch(Intent::MarkKnown(true)),
            KeyCode::Char('u') => self.dispatch(Intent::MarkKnown(false)),
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Right => self.dispatch(Intent::NextRequested),
            KeyCode::Char('p') => self.speak(),
            KeyCode::Char('f') => self.dispatch(Intent::Finish),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.view = View::Menu,
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    fn handle_load_error_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char('r') = key.code {
            self.reload_catalog();
        }
    }

    fn open_entry(&mut self, entry: MenuEntry) {
        match entry {
            MenuEntry::Quiz => self.start_game(GameType::Quiz),
            MenuEntry::Flashcards => self.start_game(GameType::Flashcard),
            MenuEntry::Stats => {
                self.refresh_stats();
                self.view = View::Stats;
            }
        }
    }

    /// Open a game, resuming whatever was stored for it.
    pub fn start_game(&mut self, game_type: GameType) {
        let Some(catalog) = &self.catalog else {
            self.view = View::LoadError;
            return;
        };
        let options = self.config.game_options(game_type);
        match Game::open(game_type, Rc::clone(catalog), self.storage.clone(), ChaCha8Rng::from_entropy(), options) {
            Ok(game) => {
                self.last_session = None;
                self.game = Some(game);
                self.view = match game_type {
                    GameType::Quiz => View::Quiz,
                    GameType::Flashcard => View::Flashcard,
                };
            }
            Err(e) => {
                tracing::error!(game = %game_type, error = %e, "failed to open game");
                self.message = Some(format!("Could not start {}: {}", game_type.name(), e));
            }
        }
    }

    fn leave_game(&mut self) {
        self.game = None;
        self.view = View::Menu;
    }

    fn dispatch(&mut self, intent: Intent) {
        let Some(game) = &mut self.game else {
            return;
        };
        match game.handle(intent) {
            Ok(Outcome::Completed(session)) => {
                self.message = Some(format!("Session complete: {} points", session.score));
                self.last_session = Some(session);
                self.refresh_stats();
            }
            Ok(Outcome::Restarted) => self.last_session = None,
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "intent failed");
                self.message = Some(format!("Error: {}", e));
            }
        }
    }

    fn speak(&mut self) {
        let request = self.game.as_ref().and_then(Game::speech_request);
        match request {
            Some(request) => self.speaker.speak(&request),
            None => self.message = Some("Answer first to hear the word.".to_string()),
        }
    }
}

fn load_catalog(config: &Config) -> LoadResult<VocabularyStore> {
    match config.catalog_path() {
        Some(path) => VocabularyStore::load(&path),
        None => VocabularyStore::from_json(BUNDLED_CATALOG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::path::Path;
    use vocab_testing::Fixtures;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_catalog(path: &Path) -> App {
        let mut config = Config::default();
        config.catalog.path = Some(path.to_path_buf());
        App::with_storage(config, MemoryStorage::shared(), Box::new(SilentSpeaker))
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let store = VocabularyStore::from_json(BUNDLED_CATALOG).unwrap();
        assert!(store.len() > 5);
    }

    #[test]
    fn test_shipped_catalog_file_matches_bundled() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/vocabulary.json");
        let app = app_with_catalog(&path);
        assert_eq!(app.view, View::Menu);
        let bundled = VocabularyStore::from_json(BUNDLED_CATALOG).unwrap();
        assert_eq!(app.catalog.as_ref().unwrap().len(), bundled.len());
    }

    #[test]
    fn test_missing_catalog_then_retry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        let mut app = app_with_catalog(&path);
        assert_eq!(app.view, View::LoadError);
        assert!(app.load_error.is_some());
        assert!(app.can_quit());

        std::fs::write(&path, Fixtures::sample_catalog_json()).unwrap();
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.view, View::Menu);
        assert_eq!(app.catalog.as_ref().unwrap().len(), 8);
    }

    #[test]
    fn test_empty_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, "[]").unwrap();
        let app = app_with_catalog(&path);
        assert_eq!(app.view, View::LoadError);
    }

    #[test]
    fn test_quiz_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, Fixtures::sample_catalog_json()).unwrap();
        let mut app = app_with_catalog(&path);

        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.view, View::Quiz);
        assert!(!app.can_quit());

        // Next is ignored until the question is answered.
        let first = app.game.as_ref().unwrap().current_item().id.clone();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.game.as_ref().unwrap().current_item().id, first);

        app.handle_key(key(KeyCode::Char('1')));
        let game = app.game.as_ref().unwrap();
        assert!(game.is_answered());
        assert!(game.feedback().is_some());

        app.handle_key(key(KeyCode::Enter));
        let game = app.game.as_ref().unwrap();
        assert_eq!(game.state().current_index(), 1);
        assert!(!game.is_answered());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::Menu);
        assert!(app.game.is_none());
    }

    #[test]
    fn test_flashcard_keys_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, Fixtures::sample_catalog_json()).unwrap();
        let mut app = app_with_catalog(&path);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::Flashcard);

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.game.as_ref().unwrap().is_flipped());
        app.handle_key(key(KeyCode::Char('y')));
        app.handle_key(key(KeyCode::Char('f')));
        assert!(app.last_session.is_some());
        assert_eq!(app.stats.flashcard_stats.known_cards, 1);

        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.view, View::Stats);
        assert_eq!(app.recent_sessions.len(), 1);
    }
}

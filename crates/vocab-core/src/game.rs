//! Game controller shared by the quiz and flashcard modes.
//!
//! A [`Game`] owns the selector and the persisted session for one game type
//! and turns user intents into state changes. Everything it changes is
//! written through to storage before the intent returns.

use crate::error::{SelectError, VocabError, VocabResult};
use crate::models::{GameSession, GameType, VocabularyItem};
use crate::progress::ProgressBook;
use crate::quiz::{AnswerFeedback, QuizQuestion, QuizScoring};
use crate::selector::{RecentItemSelector, SelectionHistory};
use crate::session::{PersistedSession, Rehydration, SessionState};
use crate::speech::SpeechRequest;
use crate::stats::{append_session, StatsAggregator, UserStats};
use crate::storage::{keys, read_json, write_json, SharedStorage};
use crate::vocabulary::VocabularyStore;
use chrono::Utc;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::rc::Rc;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Quiz: an option was chosen.
    AnswerSelected(String),
    /// Move to the next item.
    NextRequested,
    /// Flashcard: turn the card over.
    FlipRequested,
    /// Flashcard: the learner knew the card or not.
    MarkKnown(bool),
    /// End the session now.
    Finish,
    /// Start a new session.
    Restart,
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not applicable in the current state.
    Ignored,
    Answered(AnswerFeedback),
    Marked { known: bool },
    Flipped { face_up: bool },
    /// A new item is being shown.
    Presented,
    /// The session finished and was folded into the stats.
    Completed(GameSession),
    Restarted,
}

/// Options shared by both modes.
#[derive(Debug, Clone, Default)]
pub struct GameOptions {
    pub scoring: QuizScoring,
    /// Questions per session; the catalog size when unset.
    pub questions_per_session: Option<usize>,
}

/// One running game.
pub struct Game<R = ChaCha8Rng> {
    game_type: GameType,
    catalog: Rc<VocabularyStore>,
    storage: SharedStorage,
    options: GameOptions,
    selector: RecentItemSelector<R>,
    session: PersistedSession,
    rehydration: Rehydration,
    current: VocabularyItem,
    question: Option<QuizQuestion>,
    feedback: Option<AnswerFeedback>,
    flipped: bool,
    progress: ProgressBook,
    aggregator: StatsAggregator,
}

impl<R: Rng> Game<R> {
    /// Restore a game from storage, or start a fresh one.
    pub fn open(
        game_type: GameType,
        catalog: Rc<VocabularyStore>,
        storage: SharedStorage,
        rng: R,
        options: GameOptions,
    ) -> VocabResult<Self> {
        if catalog.is_empty() {
            return Err(SelectError::EmptyCatalog.into());
        }

        let (session, rehydration) = PersistedSession::rehydrate(storage.clone(), game_type)?;
        let history = SelectionHistory::restore(storage.as_ref(), &keys::recent_items(game_type))?;
        let mut selector = RecentItemSelector::new(rng).with_history(history);

        let saved_id = read_json::<String>(storage.as_ref(), &keys::current_item(game_type))?.into_option();
        let restored = saved_id.as_deref().and_then(|id| catalog.by_id(id)).cloned();
        let needs_pick = restored.is_none();
        let current = match restored {
            Some(item) => item,
            None => selector.pick(catalog.items())?.clone(),
        };

        let progress = match game_type {
            GameType::Flashcard => ProgressBook::load(storage.as_ref())?,
            GameType::Quiz => ProgressBook::new(),
        };

        let mut game = Self {
            game_type,
            catalog,
            storage,
            options,
            selector,
            session,
            rehydration,
            current: current.clone(),
            question: None,
            feedback: None,
            flipped: false,
            progress,
            aggregator: StatsAggregator::new(),
        };
        game.present(current, needs_pick)?;
        game.restore_feedback()?;

        let state = game.session.state();
        let unstarted = !state.is_complete() && (!state.is_in_progress() || state.total_questions() == 0);
        if unstarted {
            let total = game.session_length();
            game.session.start(total)?;
        }

        tracing::info!(game = %game_type, ?rehydration, item = %game.current.id, "game opened");
        Ok(game)
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    /// What storage held when the game was opened.
    pub fn rehydration(&self) -> Rehydration {
        self.rehydration
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn current_item(&self) -> &VocabularyItem {
        &self.current
    }

    /// The current quiz question. Always `None` for flashcards.
    pub fn question(&self) -> Option<&QuizQuestion> {
        self.question.as_ref()
    }

    /// Feedback for the answer given to the current question, if any.
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Whether the item at the current index has been answered or marked.
    pub fn is_answered(&self) -> bool {
        let state = self.session.state();
        state.is_answered(state.current_index())
    }

    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    pub fn history(&self) -> &SelectionHistory {
        self.selector.history()
    }

    pub fn catalog(&self) -> &VocabularyStore {
        &self.catalog
    }

    /// Stored cumulative statistics.
    pub fn user_stats(&self) -> VocabResult<UserStats> {
        Ok(UserStats::load(self.storage.as_ref())?)
    }

    /// Pronunciation for the current item, when it may be played.
    ///
    /// Quiz answers are only spoken once the question has been answered.
    pub fn speech_request(&self) -> Option<SpeechRequest> {
        if self.game_type == GameType::Quiz && !self.is_answered() {
            return None;
        }
        let request = SpeechRequest::new(&self.current.word);
        let hint = &self.current.pronunciation_guide;
        Some(if hint.is_empty() {
            request
        } else {
            request.with_hint(hint)
        })
    }

    /// Apply a user intent.
    pub fn handle(&mut self, intent: Intent) -> VocabResult<Outcome> {
        let result = match intent {
            Intent::AnswerSelected(option) => self.answer(&option),
            Intent::NextRequested => self.next(),
            Intent::FlipRequested => Ok(self.flip()),
            Intent::MarkKnown(known) => self.mark_known(known),
            Intent::Finish => self.finish(),
            Intent::Restart => self.restart(),
        };
        match result {
            // Invalid transitions are logged by the session and ignored here.
            Err(VocabError::Session(_)) => Ok(Outcome::Ignored),
            other => other,
        }
    }

    fn answer(&mut self, option: &str) -> VocabResult<Outcome> {
        let Some(question) = &self.question else {
            return Ok(Outcome::Ignored);
        };
        if self.is_answered() || !self.session.state().is_in_progress() {
            return Ok(Outcome::Ignored);
        }

        let feedback = question.check(option);
        let index = self.session.state().current_index();
        let delta = self.options.scoring.delta(feedback.is_correct);
        self.session.record_answer(index, feedback.is_correct, delta)?;
        write_json(self.storage.as_ref(), &keys::current_answer(self.game_type), option)?;
        tracing::debug!(item = %self.current.id, correct = feedback.is_correct, "answered");

        self.feedback = Some(feedback.clone());
        Ok(Outcome::Answered(feedback))
    }

    fn flip(&mut self) -> Outcome {
        if self.game_type != GameType::Flashcard {
            return Outcome::Ignored;
        }
        self.flipped = !self.flipped;
        Outcome::Flipped {
            face_up: self.flipped,
        }
    }

    fn mark_known(&mut self, known: bool) -> VocabResult<Outcome> {
        if self.game_type != GameType::Flashcard || self.is_answered() {
            return Ok(Outcome::Ignored);
        }
        let index = self.session.state().current_index();
        self.session.record_answer(index, known, 0)?;

        self.progress.mark(&self.current.id, known, Utc::now());
        self.progress.save(self.storage.as_ref())?;
        Ok(Outcome::Marked { known })
    }

    fn next(&mut self) -> VocabResult<Outcome> {
        if !self.session.state().is_in_progress() {
            return Ok(Outcome::Ignored);
        }

        self.remember_current()?;
        self.session.advance()?;

        let state = self.session.state();
        if state.current_index() >= state.total_questions() {
            return self.finish();
        }

        let item = self.selector.pick(self.catalog.items())?.clone();
        self.present(item, true)?;
        Ok(Outcome::Presented)
    }

    fn finish(&mut self) -> VocabResult<Outcome> {
        let Some(session) = self.session.complete()? else {
            return Ok(Outcome::Ignored);
        };

        let storage = self.storage.as_ref();
        append_session(storage, &session)?;
        let stats = UserStats::load(storage)?;
        let stats = self
            .aggregator
            .record_session(&stats, &session, Utc::now().date_naive());
        stats.save(storage)?;

        tracing::info!(
            game = %self.game_type,
            score = session.score,
            answered = session.answered_questions,
            "session complete"
        );
        Ok(Outcome::Completed(session))
    }

    fn restart(&mut self) -> VocabResult<Outcome> {
        let total = self.session_length();
        self.session.start(total)?;
        self.remember_current()?;
        let item = self.selector.pick(self.catalog.items())?.clone();
        self.present(item, true)?;
        Ok(Outcome::Restarted)
    }

    /// Put the item on screen into the selection history.
    fn remember_current(&mut self) -> VocabResult<()> {
        self.selector.record(&self.current.id);
        self.selector
            .persist(self.storage.as_ref(), &keys::recent_items(self.game_type))?;
        Ok(())
    }

    /// Show an item, resetting per-item UI state.
    fn present(&mut self, item: VocabularyItem, persist: bool) -> VocabResult<()> {
        if persist {
            let storage = self.storage.as_ref();
            write_json(storage, &keys::current_item(self.game_type), &item.id)?;
            storage.remove(&keys::current_answer(self.game_type))?;
        }
        self.question = match self.game_type {
            GameType::Quiz => Some(QuizQuestion::new(&item, self.selector.rng_mut())),
            GameType::Flashcard => None,
        };
        self.current = item;
        self.feedback = None;
        self.flipped = false;
        Ok(())
    }

    /// Rebuild quiz feedback when the current question was answered before reopening.
    fn restore_feedback(&mut self) -> VocabResult<()> {
        if !self.is_answered() {
            return Ok(());
        }
        let Some(question) = &self.question else {
            return Ok(());
        };
        let saved = read_json::<String>(self.storage.as_ref(), &keys::current_answer(self.game_type))?;
        self.feedback = saved.into_option().map(|option| question.check(&option));
        Ok(())
    }

    fn session_length(&self) -> usize {
        self.options
            .questions_per_session
            .filter(|&n| n > 0)
            .unwrap_or(self.catalog.len())
    }
}

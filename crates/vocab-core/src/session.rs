//! Per-game session state machine.
//!
//! `NotStarted -> InProgress -> Complete`, with `start` and `reset` valid from
//! any phase. [`PersistedSession`] writes the state through to storage after
//! every successful transition.

use crate::error::{SessionError, SessionResult, VocabResult};
use crate::models::{GameSession, GameType};
use crate::storage::{keys, read_json, write_json, SharedStorage, Storage, Stored};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Complete,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Progress of one play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    phase: SessionPhase,
    current_index: usize,
    score: u32,
    total_questions: usize,
    answered_indices: BTreeSet<usize>,
    correct_answers: usize,
    start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh, not yet started session.
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            current_index: 0,
            score: 0,
            total_questions: 0,
            answered_indices: BTreeSet::new(),
            correct_answers: 0,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    pub fn answered_indices(&self) -> &BTreeSet<usize> {
        &self.answered_indices
    }

    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    pub fn is_in_progress(&self) -> bool {
        self.phase == SessionPhase::InProgress
    }

    /// Whether the question at `index` has been answered.
    pub fn is_answered(&self, index: usize) -> bool {
        self.answered_indices.contains(&index)
    }

    /// Begin a new session, discarding any previous progress.
    pub fn start(&mut self, total_questions: usize) {
        *self = Self {
            phase: SessionPhase::InProgress,
            total_questions,
            ..Self::new()
        };
    }

    /// Record an answer to the question at `index`.
    ///
    /// Returns `false` when the index was already answered, in which case
    /// nothing changes. The score never drops below zero.
    pub fn record_answer(&mut self, index: usize, is_correct: bool, points_delta: i32) -> SessionResult<bool> {
        self.require_in_progress("record an answer")?;
        if !self.answered_indices.insert(index) {
            return Ok(false);
        }
        if is_correct {
            self.correct_answers += 1;
        }
        let score = i64::from(self.score) + i64::from(points_delta);
        self.score = score.clamp(0, i64::from(u32::MAX)) as u32;
        Ok(true)
    }

    /// Move to the next question.
    pub fn advance(&mut self) -> SessionResult<()> {
        self.require_in_progress("advance")?;
        self.current_index += 1;
        Ok(())
    }

    /// Finish the session.
    ///
    /// Returns `true` on the transition and `false` if already complete.
    pub fn complete(&mut self) -> SessionResult<bool> {
        match self.phase {
            SessionPhase::Complete => Ok(false),
            SessionPhase::InProgress => {
                self.phase = SessionPhase::Complete;
                self.end_time = Some(Utc::now());
                Ok(true)
            }
            SessionPhase::NotStarted => Err(SessionError::InvalidState {
                operation: "complete",
                phase: self.phase,
            }),
        }
    }

    /// Return to a fresh, not started session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The archived record of a completed session.
    pub fn archive(&self, game_type: GameType) -> Option<GameSession> {
        let end_time = self.end_time.filter(|_| self.is_complete())?;
        Some(GameSession {
            id: Uuid::new_v4(),
            game_type,
            start_time: self.start_time,
            end_time,
            score: self.score,
            total_questions: self.total_questions,
            answered_questions: self.answered_indices.len(),
            correct_answers: self.correct_answers,
            difficulty: None,
        })
    }

    /// Check invariants that the JSON shape alone does not enforce.
    pub fn is_consistent(&self) -> bool {
        let end_matches_phase = self.end_time.is_some() == self.is_complete();
        let not_started_is_empty = self.phase != SessionPhase::NotStarted
            || (self.current_index == 0 && self.score == 0 && self.answered_indices.is_empty());
        end_matches_phase
            && not_started_is_empty
            && self.correct_answers <= self.answered_indices.len()
    }

    fn require_in_progress(&self, operation: &'static str) -> SessionResult<()> {
        if self.phase == SessionPhase::InProgress {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                phase: self.phase,
            })
        }
    }
}

/// What [`PersistedSession::rehydrate`] found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rehydration {
    /// A valid stored state was restored.
    Found,
    /// Nothing was stored; a fresh state was created.
    NotFound,
    /// The stored state was unreadable or inconsistent and was discarded.
    Corrupt,
}

/// A session whose every transition is written through to storage.
pub struct PersistedSession {
    game_type: GameType,
    key: String,
    state: SessionState,
    storage: SharedStorage,
}

impl PersistedSession {
    /// Restore the stored session for a game, or create a fresh one.
    pub fn rehydrate(storage: SharedStorage, game_type: GameType) -> VocabResult<(Self, Rehydration)> {
        let key = keys::state(game_type);
        let (state, found) = match read_json::<SessionState>(storage.as_ref(), &key)? {
            Stored::Found(state) if state.is_consistent() => (state, Rehydration::Found),
            Stored::Found(_) => {
                tracing::warn!(key = %key, "discarding inconsistent session state");
                storage.remove(&key)?;
                (SessionState::new(), Rehydration::Corrupt)
            }
            Stored::Corrupt(_) => (SessionState::new(), Rehydration::Corrupt),
            Stored::NotFound => (SessionState::new(), Rehydration::NotFound),
        };
        tracing::debug!(game = %game_type, ?found, phase = %state.phase(), "rehydrated session");

        let session = Self {
            game_type,
            key,
            state,
            storage,
        };
        Ok((session, found))
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn start(&mut self, total_questions: usize) -> VocabResult<()> {
        self.state.start(total_questions);
        self.save()
    }

    pub fn record_answer(&mut self, index: usize, is_correct: bool, points_delta: i32) -> VocabResult<bool> {
        let recorded = self.logged(|s| s.record_answer(index, is_correct, points_delta))?;
        if recorded {
            self.save()?;
        }
        Ok(recorded)
    }

    pub fn advance(&mut self) -> VocabResult<()> {
        self.logged(SessionState::advance)?;
        self.save()
    }

    /// Complete the session, returning the archive on the first call only.
    pub fn complete(&mut self) -> VocabResult<Option<GameSession>> {
        if !self.logged(SessionState::complete)? {
            return Ok(None);
        }
        self.save()?;
        Ok(self.state.archive(self.game_type))
    }

    pub fn reset(&mut self) -> VocabResult<()> {
        self.state.reset();
        self.save()
    }

    fn logged<T>(&mut self, op: impl FnOnce(&mut SessionState) -> SessionResult<T>) -> SessionResult<T> {
        op(&mut self.state).inspect_err(|e| {
            tracing::warn!(game = %self.game_type, error = %e, "ignored session transition");
        })
    }

    fn save(&self) -> VocabResult<()> {
        write_json(self.storage.as_ref(), &self.key, &self.state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VocabError;
    use crate::storage::MemoryStorage;

    fn in_progress(total: usize) -> SessionState {
        let mut state = SessionState::new();
        state.start(total);
        state
    }

    #[test]
    fn test_start_resets_counters() {
        let mut state = in_progress(10);
        state.record_answer(0, true, 100).unwrap();
        state.advance().unwrap();

        state.start(4);
        assert_eq!(state.phase(), SessionPhase::InProgress);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.total_questions(), 4);
        assert!(state.answered_indices().is_empty());
        assert!(!state.is_complete());
    }

    #[test]
    fn test_record_answer_scenario() {
        let mut state = in_progress(5);
        assert!(state.record_answer(2, true, 100).unwrap());
        assert_eq!(state.score(), 100);
        assert_eq!(state.answered_indices().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(state.correct_answers(), 1);
    }

    #[test]
    fn test_record_answer_is_idempotent() {
        let mut state = in_progress(5);
        state.record_answer(1, true, 100).unwrap();
        assert!(!state.record_answer(1, true, 100).unwrap());
        assert_eq!(state.score(), 100);
        assert_eq!(state.answered_indices().len(), 1);
        assert_eq!(state.correct_answers(), 1);
    }

    #[test]
    fn test_score_floor() {
        let mut state = in_progress(5);
        state.record_answer(0, false, -25).unwrap();
        assert_eq!(state.score(), 0);
        state.record_answer(1, true, 100).unwrap();
        state.record_answer(2, false, -250).unwrap();
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_transitions_require_in_progress() {
        let mut state = SessionState::new();
        assert!(matches!(
            state.record_answer(0, true, 1),
            Err(SessionError::InvalidState { phase: SessionPhase::NotStarted, .. })
        ));
        assert!(state.advance().is_err());
        assert!(state.complete().is_err());

        let mut state = in_progress(2);
        state.complete().unwrap();
        assert!(matches!(
            state.record_answer(0, true, 1),
            Err(SessionError::InvalidState { phase: SessionPhase::Complete, .. })
        ));
        assert!(state.advance().is_err());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut state = in_progress(3);
        assert!(state.complete().unwrap());
        let first = state.clone();
        assert!(!state.complete().unwrap());
        assert_eq!(state, first);
        assert!(state.end_time().is_some());
    }

    #[test]
    fn test_reset_from_complete() {
        let mut state = in_progress(3);
        state.record_answer(0, true, 10).unwrap();
        state.complete().unwrap();
        state.reset();
        assert_eq!(state.phase(), SessionPhase::NotStarted);
        assert_eq!(state.total_questions(), 0);
        assert_eq!(state.end_time(), None);
    }

    #[test]
    fn test_archive_only_when_complete() {
        let mut state = in_progress(4);
        assert!(state.archive(GameType::Quiz).is_none());
        state.record_answer(0, true, 100).unwrap();
        state.record_answer(1, false, -25).unwrap();
        state.complete().unwrap();

        let session = state.archive(GameType::Quiz).unwrap();
        assert_eq!(session.score, 75);
        assert_eq!(session.total_questions, 4);
        assert_eq!(session.answered_questions, 2);
        assert_eq!(session.correct_answers, 1);
        assert_eq!(session.end_time, state.end_time().unwrap());
    }

    #[test]
    fn test_json_roundtrip_all_phases() {
        let not_started = SessionState::new();
        let mut in_prog = in_progress(6);
        in_prog.record_answer(3, true, 100).unwrap();
        in_prog.advance().unwrap();
        let mut complete = in_prog.clone();
        complete.complete().unwrap();

        for state in [not_started, in_prog, complete] {
            let json = serde_json::to_string(&state).unwrap();
            let back: SessionState = serde_json::from_str(&json).unwrap();
            assert_eq!(back, state);
        }
    }

    #[test]
    fn test_inconsistent_state_detected() {
        let mut state = in_progress(2);
        state.end_time = Some(Utc::now());
        assert!(!state.is_consistent());
    }

    #[test]
    fn test_persisted_write_through() {
        let storage = MemoryStorage::shared();
        let (mut session, found) = PersistedSession::rehydrate(storage.clone(), GameType::Quiz).unwrap();
        assert_eq!(found, Rehydration::NotFound);

        session.start(3).unwrap();
        session.record_answer(0, true, 100).unwrap();
        session.advance().unwrap();

        let (restored, found) = PersistedSession::rehydrate(storage.clone(), GameType::Quiz).unwrap();
        assert_eq!(found, Rehydration::Found);
        assert_eq!(restored.state(), session.state());

        let (other, found) = PersistedSession::rehydrate(storage, GameType::Flashcard).unwrap();
        assert_eq!(found, Rehydration::NotFound);
        assert_eq!(other.state().phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_persisted_complete_archives_once() {
        let storage = MemoryStorage::shared();
        let (mut session, _) = PersistedSession::rehydrate(storage, GameType::Quiz).unwrap();
        session.start(1).unwrap();
        assert!(session.complete().unwrap().is_some());
        assert!(session.complete().unwrap().is_none());
    }

    #[test]
    fn test_persisted_invalid_transition_is_error() {
        let storage = MemoryStorage::shared();
        let (mut session, _) = PersistedSession::rehydrate(storage, GameType::Quiz).unwrap();
        let err = session.advance().unwrap_err();
        assert!(matches!(err, VocabError::Session(SessionError::InvalidState { .. })));
    }

    #[test]
    fn test_corrupt_state_discarded() {
        let storage = MemoryStorage::shared();
        storage.set("quiz-state", "{\"phase\": 12").unwrap();
        let (session, found) = PersistedSession::rehydrate(storage.clone(), GameType::Quiz).unwrap();
        assert_eq!(found, Rehydration::Corrupt);
        assert_eq!(session.state().phase(), SessionPhase::NotStarted);
        assert_eq!(storage.get("quiz-state").unwrap(), None);

        let mut bad = in_progress(2);
        bad.end_time = Some(Utc::now());
        storage.set("quiz-state", &serde_json::to_string(&bad).unwrap()).unwrap();
        let (_, found) = PersistedSession::rehydrate(storage, GameType::Quiz).unwrap();
        assert_eq!(found, Rehydration::Corrupt);
    }
}

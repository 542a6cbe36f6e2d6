//! Property tests for selection, scoring and storage tolerance.

use proptest::prelude::*;
use std::rc::Rc;
use vocab_core::{
    Game, GameOptions, MemoryStorage, RecentItemSelector, SessionState, Storage, VocabularyStore,
    HISTORY_WINDOW,
};
use vocab_testing::generators::{answer, catalog, game_type, intent_sequence, stored_blob};
use vocab_testing::Fixtures;

fn store(items: Vec<vocab_core::VocabularyItem>) -> Rc<VocabularyStore> {
    Rc::new(VocabularyStore::from_items(items).unwrap())
}

proptest! {
    #[test]
    fn test_no_repeat_within_window(items in catalog(6..30), seed in any::<u64>(), draws in 10usize..80) {
        let mut selector = RecentItemSelector::seeded(seed);
        let picks: Vec<String> = (0..draws)
            .map(|_| selector.select_next(&items).unwrap().id.clone())
            .collect();
        for window in picks.windows(HISTORY_WINDOW + 1) {
            prop_assert!(!window[..HISTORY_WINDOW].contains(&window[HISTORY_WINDOW]));
        }
        prop_assert!(selector.history().len() <= HISTORY_WINDOW);
    }

    #[test]
    fn test_small_catalogs_always_select(items in catalog(1..6), seed in any::<u64>()) {
        let mut selector = RecentItemSelector::seeded(seed);
        for _ in 0..20 {
            let id = selector.select_next(&items).unwrap().id.clone();
            prop_assert!(items.iter().any(|item| item.id == id));
        }
    }

    #[test]
    fn test_answers_keep_session_consistent(answers in prop::collection::vec(answer(), 0..40)) {
        let mut state = SessionState::new();
        state.start(12);
        for (index, is_correct, delta) in answers {
            let before = state.clone();
            let recorded = state.record_answer(index, is_correct, delta).unwrap();
            if !recorded {
                prop_assert_eq!(&state, &before);
            }
            prop_assert!(state.is_consistent());
            prop_assert!(state.correct_answers() <= state.answered_indices().len());
        }
    }

    #[test]
    fn test_open_tolerates_any_stored_blob(game in game_type(), blob in stored_blob(), slot in 0usize..5) {
        let storage = MemoryStorage::shared();
        let key = match slot {
            0 => format!("{game}-state"),
            1 => format!("{game}-recent-items"),
            2 => format!("{game}-current-item"),
            3 => "flashcard-progress".to_string(),
            _ => "user-stats".to_string(),
        };
        storage.set(&key, &blob).unwrap();

        let catalog = Fixtures::catalog(9);
        let game = Game::open(game, Rc::clone(&catalog), storage, Fixtures::rng(1), GameOptions::default()).unwrap();
        prop_assert!(catalog.by_id(&game.current_item().id).is_some());
        prop_assert!(game.state().is_consistent());
        prop_assert!(game.history().len() <= HISTORY_WINDOW);
        game.user_stats().unwrap();
    }

    #[test]
    fn test_intents_preserve_invariants(
        items in catalog(1..12),
        game in game_type(),
        intents in intent_sequence(0..60),
        seed in any::<u64>(),
    ) {
        let catalog = store(items);
        let storage = MemoryStorage::shared();
        let mut runner = Game::open(game, Rc::clone(&catalog), storage.clone(), Fixtures::rng(seed), GameOptions::default()).unwrap();

        for intent in intents {
            runner.handle(intent).unwrap();
            prop_assert!(runner.state().is_consistent());
            prop_assert!(runner.history().len() <= HISTORY_WINDOW);
            prop_assert!(catalog.by_id(&runner.current_item().id).is_some());
        }

        let reopened = Game::open(game, Rc::clone(&catalog), storage, Fixtures::rng(seed ^ 1), GameOptions::default()).unwrap();
        prop_assert_eq!(reopened.state(), runner.state());
        prop_assert_eq!(reopened.history(), runner.history());
        prop_assert_eq!(&reopened.current_item().id, &runner.current_item().id);
    }
}

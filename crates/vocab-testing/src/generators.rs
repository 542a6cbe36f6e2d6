//! Property-based testing generators.
//!
//! Proptest strategies for catalogs, intents and stored blobs.

use proptest::prelude::*;
use proptest::strategy::{BoxedStrategy, Strategy};
use vocab_core::{GameType, Intent, VocabularyItem};

/// Either game mode.
pub fn game_type() -> impl Strategy<Value = GameType> {
    prop_oneof![Just(GameType::Quiz), Just(GameType::Flashcard)]
}

/// Short lowercase ids.
pub fn item_id() -> impl Strategy<Value = String> {
    "[a-z]{1,4}[0-9]{0,2}"
}

/// Valid catalogs with unique ids and a size drawn from `size`.
///
/// Every item has one distractor so quiz questions have two options.
pub fn catalog(size: std::ops::Range<usize>) -> impl Strategy<Value = Vec<VocabularyItem>> {
    prop::collection::btree_set(item_id(), size).prop_map(|ids| {
        ids.into_iter()
            .map(|id| {
                let word = format!("w-{id}");
                VocabularyItem::new(id, word).with_quiz("Pick _____.", &[("decoy", "")], "")
            })
            .collect()
    })
}

/// One recorded answer: `(index, is_correct, points_delta)`.
pub fn answer() -> impl Strategy<Value = (usize, bool, i32)> {
    (0usize..12, any::<bool>(), -300i32..300)
}

/// Raw values that may or may not decode as anything.
pub fn stored_blob() -> BoxedStrategy<String> {
    prop_oneof![
        any::<String>(),
        Just(String::new()),
        Just("null".to_string()),
        Just("[]".to_string()),
        Just("{}".to_string()),
        Just("{\"phase\":\"inProgress\"}".to_string()),
        "\\[\"[a-z]{1,3}\"(,\"[a-z]{1,3}\"){0,8}\\]",
    ]
    .boxed()
}

/// Intents a user can produce. Answers are either the generated word or the decoy.
pub fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        3 => Just(Intent::NextRequested),
        2 => prop_oneof![Just("decoy".to_string()), item_id().prop_map(|id| format!("w-{id}"))]
            .prop_map(Intent::AnswerSelected),
        1 => Just(Intent::FlipRequested),
        2 => any::<bool>().prop_map(Intent::MarkKnown),
        1 => Just(Intent::Finish),
        1 => Just(Intent::Restart),
    ]
}

/// A run of intents.
pub fn intent_sequence(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Intent>> {
    prop::collection::vec(intent(), len)
}

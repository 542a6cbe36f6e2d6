//! Per-card flashcard progress.

use crate::error::StorageResult;
use crate::storage::{keys, read_json, write_json, Storage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Review record for a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardProgress {
    pub card_id: String,
    pub is_known: bool,
    pub review_count: u32,
    pub last_reviewed: DateTime<Utc>,
}

/// Progress for every reviewed card, keyed by card id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    cards: BTreeMap<String, FlashcardProgress>,
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a review of a card.
    pub fn mark(&mut self, card_id: &str, known: bool, at: DateTime<Utc>) -> &FlashcardProgress {
        let entry = self
            .cards
            .entry(card_id.to_string())
            .or_insert_with(|| FlashcardProgress {
                card_id: card_id.to_string(),
                is_known: known,
                review_count: 0,
                last_reviewed: at,
            });
        entry.is_known = known;
        entry.review_count += 1;
        entry.last_reviewed = at;
        entry
    }

    pub fn get(&self, card_id: &str) -> Option<&FlashcardProgress> {
        self.cards.get(card_id)
    }

    /// Number of distinct cards reviewed.
    pub fn reviewed(&self) -> usize {
        self.cards.len()
    }

    /// Number of cards currently marked known.
    pub fn known(&self) -> usize {
        self.cards.values().filter(|p| p.is_known).count()
    }

    /// Read the stored book; missing or corrupt values give an empty one.
    pub fn load(storage: &dyn Storage) -> StorageResult<Self> {
        Ok(read_json(storage, keys::FLASHCARD_PROGRESS)?.unwrap_or_default())
    }

    pub fn save(&self, storage: &dyn Storage) -> StorageResult<()> {
        write_json(storage, keys::FLASHCARD_PROGRESS, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_mark_counts_reviews() {
        let mut book = ProgressBook::new();
        let now = Utc::now();
        book.mark("a", false, now);
        let progress = book.mark("a", true, now).clone();

        assert!(progress.is_known);
        assert_eq!(progress.review_count, 2);
        book.mark("b", false, now);
        assert_eq!(book.reviewed(), 2);
        assert_eq!(book.known(), 1);
    }

    #[test]
    fn test_roundtrip_and_corruption() {
        let storage = MemoryStorage::new();
        let mut book = ProgressBook::new();
        book.mark("a", true, Utc::now());
        book.save(&storage).unwrap();
        assert_eq!(ProgressBook::load(&storage).unwrap(), book);

        storage.set(keys::FLASHCARD_PROGRESS, "[").unwrap();
        assert_eq!(ProgressBook::load(&storage).unwrap(), ProgressBook::new());
    }
}

//! Read-only vocabulary catalog.

use crate::error::{LoadError, LoadResult};
use crate::models::{Difficulty, VocabularyItem};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;

/// The fixed list of vocabulary entries for a process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocabularyStore {
    items: Vec<VocabularyItem>,
    index: HashMap<String, usize>,
}

impl VocabularyStore {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), items = store.len(), "loaded vocabulary catalog");
        Ok(store)
    }

    /// Parse a catalog from a JSON array.
    pub fn from_json(json: &str) -> LoadResult<Self> {
        let items: Vec<VocabularyItem> = serde_json::from_str(json)?;
        Self::from_items(items)
    }

    /// Build a catalog, validating ids and options.
    pub fn from_items(items: Vec<VocabularyItem>) -> LoadResult<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(LoadError::MissingField { index: i, field: "id" });
            }
            if item.word.trim().is_empty() {
                return Err(LoadError::MissingField { index: i, field: "word" });
            }
            let count = item.word_occurrences();
            if count != 1 {
                return Err(LoadError::InvalidOptions {
                    id: item.id.clone(),
                    word: item.word.clone(),
                    count,
                });
            }
            if index.insert(item.id.clone(), i).is_some() {
                return Err(LoadError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items, index })
    }

    /// All items in catalog order.
    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    pub fn by_id(&self, id: &str) -> Option<&VocabularyItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Items in a category, in catalog order.
    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a VocabularyItem> + 'a {
        self.items.iter().filter(move |item| item.category == category)
    }

    /// Items at a difficulty level, in catalog order.
    pub fn by_difficulty(
        &self,
        level: Difficulty,
    ) -> impl Iterator<Item = &VocabularyItem> + '_ {
        self.items.iter().filter(move |item| item.difficulty == level)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(item.category.as_str());
            }
        }
        seen
    }

    /// `n` distinct items sampled uniformly without replacement.
    ///
    /// When `n` is at least the catalog size the whole catalog is returned
    /// in shuffled order.
    pub fn random_sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&VocabularyItem> {
        let mut picked: Vec<&VocabularyItem> = self.items.iter().collect();
        picked.shuffle(rng);
        picked.truncate(n);
        picked
    }
}

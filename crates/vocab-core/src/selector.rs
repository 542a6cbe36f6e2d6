//! Next-item selection with a short no-repeat window.
//!
//! Selection is uniform random. Items shown within the last
//! [`HISTORY_WINDOW`] presentations are excluded while other candidates
//! remain; once every item is in the window the window is cleared.

use crate::error::{SelectError, StorageResult};
use crate::models::{ItemId, VocabularyItem};
use crate::storage::{read_json, write_json, Storage, Stored};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of recent presentations excluded from selection.
pub const HISTORY_WINDOW: usize = 5;

/// Most recently presented item ids, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionHistory {
    ids: VecDeque<ItemId>,
}

impl SelectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a presentation. A repeated id moves to the front.
    pub fn record(&mut self, id: &str) {
        self.ids.retain(|existing| existing != id);
        self.ids.push_front(id.to_string());
        self.ids.truncate(HISTORY_WINDOW);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids, newest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Load a stored history. Missing or corrupt blobs give an empty one.
    pub fn restore(storage: &dyn Storage, key: &str) -> StorageResult<Self> {
        let history = match read_json::<Self>(storage, key)? {
            Stored::Found(history) => history.normalize(),
            Stored::NotFound | Stored::Corrupt(_) => Self::new(),
        };
        Ok(history)
    }

    /// Drop entries past the window, e.g. after restoring an oversized blob.
    fn normalize(mut self) -> Self {
        self.ids.truncate(HISTORY_WINDOW);
        self
    }
}

/// Outcome of a pick before it is recorded.
struct Pick<'a> {
    item: &'a VocabularyItem,
    window_exhausted: bool,
}

fn pick<'a, R: Rng + ?Sized>(
    catalog: &'a [VocabularyItem],
    history: &SelectionHistory,
    rng: &mut R,
) -> Result<Pick<'a>, SelectError> {
    if catalog.len() <= HISTORY_WINDOW {
        let item = catalog.choose(rng).ok_or(SelectError::EmptyCatalog)?;
        return Ok(Pick {
            item,
            window_exhausted: false,
        });
    }

    let candidates: Vec<&VocabularyItem> = catalog
        .iter()
        .filter(|item| !history.contains(&item.id))
        .collect();

    match candidates.choose(rng) {
        Some(item) => Ok(Pick {
            item: *item,
            window_exhausted: false,
        }),
        None => {
            let item = catalog.choose(rng).ok_or(SelectError::EmptyCatalog)?;
            Ok(Pick {
                item,
                window_exhausted: true,
            })
        }
    }
}

/// Select the next item and return the history with it recorded.
pub fn select_next<'a, R: Rng + ?Sized>(
    catalog: &'a [VocabularyItem],
    history: &SelectionHistory,
    rng: &mut R,
) -> Result<(&'a VocabularyItem, SelectionHistory), SelectError> {
    let Pick {
        item,
        window_exhausted,
    } = pick(catalog, history, rng)?;

    let mut updated = if window_exhausted {
        SelectionHistory::new()
    } else {
        history.clone()
    };
    updated.record(&item.id);
    Ok((item, updated))
}

/// Stateful selector owned by one game.
#[derive(Debug, Clone)]
pub struct RecentItemSelector<R = ChaCha8Rng> {
    history: SelectionHistory,
    rng: R,
}

impl RecentItemSelector<ChaCha8Rng> {
    /// Selector seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Selector with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> RecentItemSelector<R> {
    pub fn new(rng: R) -> Self {
        Self {
            history: SelectionHistory::new(),
            rng,
        }
    }

    /// Start from an existing history.
    pub fn with_history(mut self, history: SelectionHistory) -> Self {
        self.history = history.normalize();
        self
    }

    pub fn history(&self) -> &SelectionHistory {
        &self.history
    }

    /// Choose the next item without recording it.
    ///
    /// If the window covers the whole catalog it is cleared here, so a later
    /// [`record`](Self::record) leaves exactly the chosen id in it.
    pub fn pick<'a>(&mut self, catalog: &'a [VocabularyItem]) -> Result<&'a VocabularyItem, SelectError> {
        let Pick {
            item,
            window_exhausted,
        } = pick(catalog, &self.history, &mut self.rng)?;
        if window_exhausted {
            tracing::debug!(catalog = catalog.len(), "history window exhausted, clearing");
            self.history.clear();
        }
        Ok(item)
    }

    /// Record that an item was presented.
    pub fn record(&mut self, id: &str) {
        self.history.record(id);
    }

    /// Pick and record in one step.
    pub fn select_next<'a>(&mut self, catalog: &'a [VocabularyItem]) -> Result<&'a VocabularyItem, SelectError> {
        let item = self.pick(catalog)?;
        self.record(&item.id);
        tracing::debug!(id = %item.id, "selected item");
        Ok(item)
    }

    /// Mutable access to the random source, e.g. for shuffling options.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Write the current history.
    pub fn persist(&self, storage: &dyn Storage, key: &str) -> StorageResult<()> {
        write_json(storage, key, &self.history)
    }
}

//! Deterministic catalogs, storage and random sources for tests.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;
use vocab_core::{Difficulty, MemoryStorage, SqliteStorage, StorageResult, VocabularyItem, VocabularyStore};

/// Collection of deterministic test fixtures.
pub struct Fixtures;

impl Fixtures {
    /// 8-item catalog with quiz prompts, explanations and mixed difficulty.
    pub fn sample_items() -> Vec<VocabularyItem> {
        vec![
            VocabularyItem::new("v1", "ephemeral")
                .with_translation("efímero")
                .with_definition("Lasting for a very short time.")
                .with_difficulty(Difficulty::Hard)
                .with_category("time")
                .with_quiz(
                    "Fame on social media is often _____.",
                    &[("eternal", "Eternal means lasting forever."), ("robust", "Robust describes strength, not duration.")],
                    "Ephemeral means short-lived, which matches fleeting fame.",
                ),
            VocabularyItem::new("v2", "diligent")
                .with_translation("diligente")
                .with_definition("Showing care and effort in one's work.")
                .with_difficulty(Difficulty::Medium)
                .with_category("character")
                .with_quiz(
                    "She was _____ about checking every figure twice.",
                    &[("careless", "Careless is the opposite of checking twice."), ("idle", "")],
                    "Diligent describes careful, persistent effort.",
                ),
            VocabularyItem::new("v3", "arid")
                .with_translation("árido")
                .with_definition("Having little or no rain.")
                .with_difficulty(Difficulty::Easy)
                .with_category("nature")
                .with_quiz(
                    "Few crops grow in such an _____ climate.",
                    &[("humid", "Humid air is full of moisture."), ("lush", "Lush land is green and fertile.")],
                    "Arid climates are too dry for most crops.",
                ),
            VocabularyItem::new("v4", "candid")
                .with_translation("franco")
                .with_definition("Truthful and straightforward.")
                .with_difficulty(Difficulty::Medium)
                .with_category("character")
                .with_quiz(
                    "He gave a _____ account of his mistakes.",
                    &[("evasive", "Evasive means avoiding the truth.")],
                    "Candid means honest and open.",
                ),
            VocabularyItem::new("v5", "meticulous")
                .with_translation("meticuloso")
                .with_definition("Showing great attention to detail.")
                .with_difficulty(Difficulty::Hard)
                .with_category("character")
                .with_quiz(
                    "The restorer was _____ with every brushstroke.",
                    &[("sloppy", "Sloppy work lacks care."), ("hasty", "Hasty means too quick to be careful.")],
                    "Meticulous means extremely careful and precise.",
                ),
            VocabularyItem::new("v6", "serene")
                .with_translation("sereno")
                .with_definition("Calm, peaceful and untroubled.")
                .with_difficulty(Difficulty::Easy)
                .with_category("mood")
                .with_quiz(
                    "The lake looked _____ at dawn.",
                    &[("turbulent", "Turbulent water is rough and disturbed.")],
                    "Serene describes a calm, peaceful scene.",
                ),
            VocabularyItem::new("v7", "frugal")
                .with_translation("frugal")
                .with_definition("Sparing with money or food.")
                .with_difficulty(Difficulty::Medium)
                .with_category("money")
                .with_quiz(
                    "Living on a _____ budget, they rarely ate out.",
                    &[("lavish", "Lavish spending is the opposite of saving.")],
                    "Frugal means economical and careful with money.",
                ),
            VocabularyItem::new("v8", "obsolete")
                .with_translation("obsoleto")
                .with_definition("No longer produced or used.")
                .with_difficulty(Difficulty::Easy)
                .with_category("time")
                .with_quiz(
                    "Fax machines are nearly _____ in most offices.",
                    &[("novel", "Novel means new and original."), ("trendy", "")],
                    "Obsolete means out of use.",
                ),
        ]
    }

    /// [`sample_items`](Self::sample_items) as a catalog.
    pub fn sample_catalog() -> Rc<VocabularyStore> {
        Rc::new(Self::store(Self::sample_items()))
    }

    /// Catalog JSON in the on-disk format.
    pub fn sample_catalog_json() -> String {
        serde_json::to_string_pretty(&Self::sample_items()).unwrap_or_default()
    }

    /// Bare items named by the given ids, e.g. `["A", "B", "C"]`.
    pub fn lettered(ids: &[&str]) -> Rc<VocabularyStore> {
        let items = ids
            .iter()
            .map(|id| VocabularyItem::new(*id, id.to_lowercase()))
            .collect();
        Rc::new(Self::store(items))
    }

    /// Catalog of `n` generated items with ids `item-0..item-n`.
    pub fn catalog(n: usize) -> Rc<VocabularyStore> {
        let items = (0..n)
            .map(|i| {
                VocabularyItem::new(format!("item-{i}"), format!("word{i}")).with_quiz(
                    format!("Sentence {i} needs _____."),
                    &[("decoy", "A decoy never fits.")],
                    format!("word{i} fits sentence {i}."),
                )
            })
            .collect();
        Rc::new(Self::store(items))
    }

    pub fn memory_storage() -> Rc<MemoryStorage> {
        MemoryStorage::shared()
    }

    /// SQLite database in a fresh temporary directory.
    ///
    /// The directory is deleted when the returned guard drops.
    pub fn scratch_sqlite() -> std::io::Result<ScratchDb> {
        let dir = TempDir::new()?;
        let path = dir.path().join("vocab.db");
        Ok(ScratchDb { dir, path })
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn store(items: Vec<VocabularyItem>) -> VocabularyStore {
        match VocabularyStore::from_items(items) {
            Ok(store) => store,
            Err(e) => panic!("fixture catalog is invalid: {e}"),
        }
    }
}

/// A database path that outlives several opens.
pub struct ScratchDb {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchDb {
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Open (or reopen) the database.
    pub fn open(&self) -> StorageResult<Rc<SqliteStorage>> {
        Ok(Rc::new(SqliteStorage::open(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_is_valid() {
        let catalog = Fixtures::sample_catalog();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.items().iter().all(|item| item.word_occurrences() == 1));
    }

    #[test]
    fn test_sample_json_loads() {
        let json = Fixtures::sample_catalog_json();
        let store = VocabularyStore::from_json(&json).unwrap();
        assert_eq!(store.items(), Fixtures::sample_catalog().items());
    }

    #[test]
    fn test_lettered_ids() {
        let catalog = Fixtures::lettered(&["A", "B"]);
        assert_eq!(catalog.by_id("B").unwrap().word, "b");
    }

    #[test]
    fn test_scratch_sqlite_reopens() {
        use vocab_core::Storage;

        let db = Fixtures::scratch_sqlite().unwrap();
        db.open().unwrap().set("k", "1").unwrap();
        assert_eq!(db.open().unwrap().get("k").unwrap().as_deref(), Some("1"));
        assert!(db.path().starts_with(db.dir()));
    }
}

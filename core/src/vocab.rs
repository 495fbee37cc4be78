use crate::persist::{KvStore, Store, VOCABULARY_KEY};
use anyhow::Result;
use std::collections::{BTreeSet, HashSet};

/// Receiver of newly indexed words. Adding a word twice is harmless.
pub trait Autocomplete {
    fn add(&mut self, word: &str);
}

impl Autocomplete for HashSet<String> {
    fn add(&mut self, word: &str) {
        self.insert(word.to_string());
    }
}

/// Sorted word list kept under the `ALL` key, used for prefix suggestions.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    words: BTreeSet<String>,
    dirty: bool,
}

impl Vocabulary {
    pub fn load<S: KvStore>(store: &Store<S>) -> Result<Self> {
        let words = store.get_json(VOCABULARY_KEY)?.unwrap_or_default();
        Ok(Self { words, dirty: false })
    }

    /// Persist if anything new was added since loading.
    pub fn save<S: KvStore>(&mut self, store: &Store<S>) -> Result<()> {
        if !self.dirty { return Ok(()); }
        store.set_json(VOCABULARY_KEY, &self.words)?;
        self.dirty = false;
        Ok(())
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    /// Words starting with `prefix`, in lexicographic order.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = prefix.trim().to_ascii_lowercase();
        self.words
            .range(prefix.clone()..)
            .take_while(|w| w.starts_with(&prefix))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl Autocomplete for Vocabulary {
    fn add(&mut self, word: &str) {
        if !self.words.contains(word) {
            self.words.insert(word.to_string());
            self.dirty = true;
        }
    }
}

use crate::index::{DocId, Document, Field, ScanRecord};
use crate::persist::{KvStore, Store};
use crate::tokenizer::{extract, Stopwords};
use crate::vocab::Autocomplete;
use anyhow::Result;
use std::collections::BTreeSet;

/// What happened to the document during one indexing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocChange {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub id: DocId,
    pub change: DocChange,
    /// Distinct words touched across all fields.
    pub words: usize,
}

/// Sole writer of documents and word records.
///
/// Every word record update is a read-modify-write of the whole record, so
/// callers must not run two indexing passes (or an indexing pass and a query)
/// against the same store at once.
pub struct Indexer<'a, S> {
    store: &'a Store<S>,
    stopwords: &'a Stopwords,
}

impl<'a, S: KvStore> Indexer<'a, S> {
    pub fn new(store: &'a Store<S>, stopwords: &'a Stopwords) -> Self { Self { store, stopwords } }

    /// Replace `doc_id`'s positions for `field` in every word of `text`.
    ///
    /// Empty text, or text without a single letter, is ignored.
    pub fn update(&self, doc_id: DocId, field: Field, text: Option<&str>, touched: &mut BTreeSet<String>) -> Result<()> {
        let Some(text) = text else { return Ok(()) };
        if !text.chars().any(|c| c.is_ascii_alphabetic()) { return Ok(()); }

        for (word, positions) in extract(text, self.stopwords) {
            let mut record = self.store.word_record(&word)?.unwrap_or_default();
            record.set(doc_id, field, positions);
            self.store.put_word_record(&word, &record)?;
            touched.insert(word);
        }
        tracing::trace!(doc_id, %field, "field indexed");
        Ok(())
    }

    /// Store a scanned page and index all of its fields.
    pub fn index(&self, scan: &ScanRecord, vocab: &mut dyn Autocomplete) -> Result<IndexReport> {
        let content = scan.content.as_deref().unwrap_or_default();
        let title = scan.title.as_deref().unwrap_or_default();

        let (id, change) = match self.store.document(&scan.url)? {
            Some(doc) => {
                if doc.text != content || doc.title != title {
                    self.store.put_document(&Document { id: doc.id, url: scan.url.clone(), title: title.to_string(), icon: scan.icon.clone(), text: content.to_string() })?;
                    (doc.id, DocChange::Updated)
                } else {
                    (doc.id, DocChange::Unchanged)
                }
            }
            None => {
                let id = self.store.count()?;
                self.store.put_url_for_id(id, &scan.url)?;
                self.store.put_count(id + 1)?;
                self.store.put_document(&Document { id, url: scan.url.clone(), title: title.to_string(), icon: scan.icon.clone(), text: content.to_string() })?;
                (id, DocChange::Created)
            }
        };

        let mut touched = BTreeSet::new();
        for field in Field::ALL {
            self.update(id, field, scan.text(field), &mut touched)?;
        }
        for word in &touched {
            vocab.add(word);
        }

        tracing::debug!(url = %scan.url, id, ?change, words = touched.len(), "indexed page");
        Ok(IndexReport { id, change, words: touched.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use std::collections::HashSet;

    fn scan(url: &str, title: &str, content: &str) -> ScanRecord {
        ScanRecord { url: url.into(), title: Some(title.into()), content: Some(content.into()), ..Default::default() }
    }

    #[test]
    fn new_pages_get_sequential_ids() {
        let store = Store::new(MemoryStore::new());
        let stop = Stopwords::english();
        let indexer = Indexer::new(&store, &stop);
        let mut vocab = HashSet::new();
        let a = indexer.index(&scan("a", "Cats", "Cats are great pets"), &mut vocab).unwrap();
        let b = indexer.index(&scan("b", "Dogs", "Dogs are great pets too"), &mut vocab).unwrap();
        assert_eq!((a.id, a.change), (0, DocChange::Created));
        assert_eq!((b.id, b.change), (1, DocChange::Created));
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.url_for_id(1).unwrap().as_deref(), Some("b"));
        assert!(vocab.contains("great") && vocab.contains("dogs"));
        assert!(!vocab.contains("are"));
    }

    #[test]
    fn update_ignores_text_without_letters() {
        let store = Store::new(MemoryStore::new());
        let stop = Stopwords::english();
        let indexer = Indexer::new(&store, &stop);
        let mut touched = BTreeSet::new();
        indexer.update(0, Field::Content, Some("123 456 789"), &mut touched).unwrap();
        indexer.update(0, Field::Content, Some(""), &mut touched).unwrap();
        indexer.update(0, Field::Content, None, &mut touched).unwrap();
        assert!(touched.is_empty());
        assert!(store.kv().is_empty());
    }

    #[test]
    fn title_change_rewrites_document() {
        let store = Store::new(MemoryStore::new());
        let stop = Stopwords::english();
        let indexer = Indexer::new(&store, &stop);
        let mut vocab = HashSet::new();
        indexer.index(&scan("a", "Cats", "Cats are great"), &mut vocab).unwrap();
        let again = indexer.index(&scan("a", "Cats", "Cats are great"), &mut vocab).unwrap();
        assert_eq!(again.change, DocChange::Unchanged);
        let retitled = indexer.index(&scan("a", "Kittens", "Cats are great"), &mut vocab).unwrap();
        assert_eq!((retitled.id, retitled.change), (0, DocChange::Updated));
        assert_eq!(store.document("a").unwrap().unwrap().title, "Kittens");
        assert_eq!(store.count().unwrap(), 1);
    }
}

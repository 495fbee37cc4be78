use crate::index::{DocId, Field, WordRecord};
use crate::persist::{KvStore, Store};
use crate::tokenizer::Stopwords;
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};

/// Raw or normalized score per document.
pub type Scores = BTreeMap<DocId, f64>;

/// Word records fetched during one query, shared across fields.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: HashMap<String, Option<WordRecord>>,
}

impl RecordCache {
    pub fn new() -> Self { Self::default() }

    pub fn fetch<S: KvStore>(&mut self, store: &Store<S>, term: &str) -> Result<Option<&WordRecord>> {
        if !self.records.contains_key(term) {
            let record = store.word_record(term)?;
            self.records.insert(term.to_string(), record);
        }
        Ok(self.records.get(term).and_then(Option::as_ref))
    }

    pub fn len(&self) -> usize { self.records.len() }
}

/// Candidate ids with the number of distinct terms whose record mentions them.
///
/// This is an OR over the terms: ids matching no term are absent.
pub fn coverage<S: KvStore>(store: &Store<S>, terms: &[String], cache: &mut RecordCache) -> Result<Scores> {
    let mut ids = Scores::new();
    let mut seen: Vec<&str> = Vec::new();
    for term in terms {
        if seen.contains(&term.as_str()) { continue; }
        seen.push(term);
        if let Some(record) = cache.fetch(store, term)? {
            for id in record.doc_ids() {
                *ids.entry(id).or_insert(0.0) += 1.0;
            }
        }
    }
    Ok(ids)
}

/// Total occurrences of the query terms in `field` for each candidate.
///
/// Short terms and stopwords are skipped; candidates without positions in the
/// field get no entry.
pub fn word_count<S: KvStore>(
    store: &Store<S>,
    candidates: &Scores,
    terms: &[String],
    field: Field,
    stopwords: &Stopwords,
    cache: &mut RecordCache,
) -> Result<Scores> {
    let mut scores = Scores::new();
    for term in terms {
        if !stopwords.is_indexable(term) { continue; }
        let Some(record) = cache.fetch(store, term)? else { continue };
        for &id in candidates.keys() {
            if let Some(positions) = record.get(id).and_then(|p| p.get(field)) {
                *scores.entry(id).or_insert(0.0) += positions.len() as f64;
            }
        }
    }
    Ok(scores)
}

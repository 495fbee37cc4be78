use crate::config::EngineConfig;
use crate::highlight::Highlighter;
use crate::index::{DocId, Document, Field, ScanRecord};
use crate::indexer::{IndexReport, Indexer};
use crate::persist::{KvStore, Store};
use crate::query::{coverage, word_count, RecordCache, Scores};
use crate::rank::{aggregate, normalize, rank, Weights};
use crate::tokenizer::{query_terms, Stopwords};
use crate::vocab::Vocabulary;
use anyhow::Result;
use serde::Serialize;

/// One ranked result, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: DocId,
    pub url: String,
    /// Highlighted, never truncated.
    pub title: String,
    /// Highlighted and truncated.
    pub snippet: String,
    pub score: f64,
    /// 1-based; documents with equal scores share a rank.
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub terms: Vec<String>,
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

/// The page archive: one store plus the settings used to index and query it.
pub struct Archive<S> {
    store: Store<S>,
    stopwords: Stopwords,
    weights: Weights,
    fallback: f64,
    highlighter: Highlighter,
}

impl<S: KvStore> Archive<S> {
    pub fn new(kv: S, config: &EngineConfig) -> Self {
        Self {
            store: Store::new(kv),
            stopwords: config.stopwords(),
            weights: config.weights.clone(),
            fallback: config.fallback,
            highlighter: Highlighter::new(config.highlight.clone()),
        }
    }

    pub fn store(&self) -> &Store<S> { &self.store }

    /// Index a scanned page and record its words for autocomplete.
    pub fn index(&self, scan: &ScanRecord) -> Result<IndexReport> {
        let mut vocab = Vocabulary::load(&self.store)?;
        let report = Indexer::new(&self.store, &self.stopwords).index(scan, &mut vocab)?;
        vocab.save(&self.store)?;
        Ok(report)
    }

    /// Weighted total per matching document.
    pub fn score(&self, terms: &[String]) -> Result<Scores> {
        let mut cache = RecordCache::new();
        let candidates = coverage(&self.store, terms, &mut cache)?;
        if candidates.is_empty() { return Ok(Scores::new()); }

        let mut signals = vec![(self.weights.coverage, normalize(&candidates, 1.0, self.fallback))];
        for field in Field::ALL {
            let raw = word_count(&self.store, &candidates, terms, field, &self.stopwords, &mut cache)?;
            signals.push((self.weights.field(field), normalize(&raw, 1.0, self.fallback)));
        }
        Ok(aggregate(signals.iter().map(|(w, s)| (*w, s))))
    }

    /// Rank documents for a free-text query and render up to `limit` hits.
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchResults> {
        let terms = query_terms(query);
        let totals = self.score(&terms)?;
        let groups = rank(&totals);

        let mut hits = Vec::new();
        'groups: for (i, group) in groups.iter().enumerate() {
            for &id in &group.ids {
                if hits.len() >= limit { break 'groups; }
                let Some(doc) = self.store.document_by_id(id)? else {
                    tracing::warn!(id, "ranked document has no stored record");
                    continue;
                };
                hits.push(SearchHit {
                    id,
                    title: self.highlighter.highlight(&doc.title, &terms, false),
                    snippet: self.highlighter.highlight(&doc.text, &terms, true),
                    url: doc.url,
                    score: group.score,
                    rank: i + 1,
                });
            }
        }

        tracing::debug!(query, terms = terms.len(), total_hits = totals.len(), returned = hits.len(), "search");
        Ok(SearchResults { terms, total_hits: totals.len(), hits })
    }

    pub fn document(&self, id: DocId) -> Result<Option<Document>> { self.store.document_by_id(id) }

    /// Most recently added pages first.
    pub fn recent(&self, limit: usize) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        let mut id = self.store.count()?;
        while id > 0 && docs.len() < limit {
            id -= 1;
            if let Some(doc) = self.store.document_by_id(id)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    pub fn suggest(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        Ok(Vocabulary::load(&self.store)?.suggest(prefix, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    fn page(url: &str, title: &str, content: &str) -> ScanRecord {
        ScanRecord { url: url.into(), title: Some(title.into()), content: Some(content.into()), ..Default::default() }
    }

    #[test]
    fn unmatched_query_returns_nothing() {
        let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
        archive.index(&page("a", "Cats", "Cats are great pets")).unwrap();
        let results = archive.search("zebra", 10).unwrap();
        assert_eq!(results.total_hits, 0);
        assert!(results.hits.is_empty());
    }

    #[test]
    fn title_weight_changes_order() {
        let mut config = EngineConfig::default();
        config.weights = Weights { coverage: 0.0, selection: 0.0, title: 1.0, priority: 0.0, content: 0.0 };
        let archive = Archive::new(MemoryStore::new(), &config);
        archive.index(&page("a", "Notes", "rust rust rust")).unwrap();
        archive.index(&page("b", "Rust", "rust")).unwrap();
        let results = archive.search("rust", 10).unwrap();
        assert_eq!(results.hits[0].url, "b");
        assert_eq!(results.hits[0].title, "<b>Rust</b>");
    }

    #[test]
    fn limit_caps_rendered_hits() {
        let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
        for i in 0..5 {
            archive.index(&page(&format!("u{i}"), "Page", "shared words here")).unwrap();
        }
        let results = archive.search("shared", 2).unwrap();
        assert_eq!(results.total_hits, 5);
        assert_eq!(results.hits.len(), 2);
        assert!(results.hits.iter().all(|h| h.rank == 1));
        assert_eq!(results.hits[0].id, 0);
    }

    #[test]
    fn recent_lists_newest_first() {
        let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
        for url in ["a", "b", "c"] {
            archive.index(&page(url, url, "some content")).unwrap();
        }
        let urls: Vec<String> = archive.recent(2).unwrap().into_iter().map(|d| d.url).collect();
        assert_eq!(urls, vec!["c", "b"]);
    }

    #[test]
    fn ids_without_stored_records_are_skipped() {
        let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
        for url in ["a", "b", "c"] {
            archive.index(&page(url, url, "orphaned content")).unwrap();
        }
        archive.store().put_count(5).unwrap();
        let urls: Vec<String> = archive.recent(10).unwrap().into_iter().map(|d| d.url).collect();
        assert_eq!(urls, vec!["c", "b", "a"]);

        let mut record = archive.store().word_record("orphaned").unwrap().unwrap();
        record.set(4, Field::Content, vec![1]);
        archive.store().put_word_record("orphaned", &record).unwrap();
        let results = archive.search("orphaned", 10).unwrap();
        assert_eq!(results.total_hits, 4);
        let ids: Vec<DocId> = results.hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn indexed_words_become_suggestions() {
        let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
        archive.index(&page("a", "Petting zoo", "pets and petals")).unwrap();
        assert_eq!(archive.suggest("pet", 10).unwrap(), vec!["petals", "pets", "petting"]);
    }
}

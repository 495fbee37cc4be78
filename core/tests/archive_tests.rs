use pagevault_core::query::{coverage, word_count, RecordCache, Scores};
use pagevault_core::rank::{normalize, DEFAULT_FALLBACK};
use pagevault_core::tokenizer::{extract, Stopwords};
use pagevault_core::{Archive, EngineConfig, Field, MemoryStore, ScanRecord, SledStore, Store, WordRecord};

fn page(url: &str, title: &str, content: &str) -> ScanRecord {
    ScanRecord {
        url: url.into(),
        title: Some(title.into()),
        content: Some(content.into()),
        selection: Some(String::new()),
        priority: Some(String::new()),
        icon: None,
    }
}

#[test]
fn extract_counts_every_raw_token() {
    let index = extract("the cat sat on the cat", &Stopwords::new(["the", "on"]));
    assert_eq!(index["cat"], vec![2, 6]);
    assert_eq!(index["sat"], vec![3]);
    assert_eq!(index.len(), 2);

    let index = extract("Alpha, beta; alpha... GAMMA alpha", &Stopwords::english());
    for positions in index.values() {
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions[0] >= 1);
    }
    assert_eq!(index["alpha"], vec![1, 3, 5]);
}

#[test]
fn indexing_twice_leaves_store_unchanged() {
    let kv = MemoryStore::new();
    let archive = Archive::new(&kv, &EngineConfig::default());
    let scan = page("a", "Cats", "Cats are great pets");
    archive.index(&scan).unwrap();
    let first = kv.snapshot();
    archive.index(&scan).unwrap();
    assert_eq!(kv.snapshot(), first);
}

#[test]
fn reindexing_content_replaces_only_that_field() {
    let kv = MemoryStore::new();
    let archive = Archive::new(&kv, &EngineConfig::default());
    let mut scan = page("a", "Cats", "cats are great");
    scan.selection = Some("cats".into());
    archive.index(&scan).unwrap();

    scan.content = Some("great cats cats".into());
    archive.index(&scan).unwrap();

    let store = Store::new(&kv);
    let cats = store.word_record("cats").unwrap().unwrap();
    let postings = cats.get(0).unwrap();
    assert_eq!(postings.get(Field::Content), Some(&[2, 3][..]));
    assert_eq!(postings.get(Field::Title), Some(&[1][..]));
    assert_eq!(postings.get(Field::Selection), Some(&[1][..]));
    assert_eq!(postings.get(Field::Priority), None);
    assert_eq!(store.document("a").unwrap().unwrap().text, "great cats cats");
}

#[test]
fn other_documents_survive_a_word_record_rewrite() {
    let kv = MemoryStore::new();
    let archive = Archive::new(&kv, &EngineConfig::default());
    archive.index(&page("a", "One", "shared")).unwrap();
    archive.index(&page("b", "Two", "shared shared")).unwrap();
    let rec = Store::new(&kv).word_record("shared").unwrap().unwrap();
    assert_eq!(rec.get(0).unwrap().get(Field::Content), Some(&[1][..]));
    assert_eq!(rec.get(1).unwrap().get(Field::Content), Some(&[1, 2][..]));
}

#[test]
fn normalized_scores_span_zero_to_one() {
    let raw: Scores = [(0, 4.0), (1, 9.0), (2, 1.0), (3, 9.0)].into_iter().collect();
    let n = normalize(&raw, 1.0, DEFAULT_FALLBACK);
    let max = n.values().copied().fold(f64::MIN, f64::max);
    let min = n.values().copied().fold(f64::MAX, f64::min);
    assert_eq!(max, 1.0);
    assert_eq!(min, 0.0);

    let flat: Scores = [(0, 2.0), (1, 2.0)].into_iter().collect();
    assert!(normalize(&flat, 1.0, DEFAULT_FALLBACK).values().all(|&v| v == DEFAULT_FALLBACK));
}

#[test]
fn only_indexable_query_terms_contribute() {
    let store = Store::new(MemoryStore::new());
    let mut cat = WordRecord::new();
    cat.set(0, Field::Content, vec![1, 4]);
    store.put_word_record("cat", &cat).unwrap();

    let stop = Stopwords::english();
    let terms: Vec<String> = ["to", "a", "cat"].iter().map(|s| s.to_string()).collect();
    let mut cache = RecordCache::new();
    let candidates = coverage(&store, &terms, &mut cache).unwrap();
    let scores = word_count(&store, &candidates, &terms, Field::Content, &stop, &mut cache).unwrap();
    assert_eq!(scores, [(0, 2.0)].into_iter().collect());

    let cat_only = word_count(&store, &candidates, &["cat".to_string()], Field::Content, &stop, &mut cache).unwrap();
    assert_eq!(scores, cat_only);
}

#[test]
fn great_pets_ranks_both_pet_pages() {
    let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
    archive.index(&page("a", "Cats", "Cats are great pets")).unwrap();
    archive.index(&page("b", "Dogs", "Dogs are great pets too")).unwrap();
    archive.index(&page("c", "Weather", "Rain expected tomorrow afternoon")).unwrap();

    let results = archive.search("great pets", 10).unwrap();
    assert_eq!(results.terms, vec!["great", "pets"]);
    let urls: Vec<&str> = results.hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, vec!["a", "b"]);
    for hit in &results.hits {
        assert!(hit.snippet.contains("<b>great</b>"));
        assert!(hit.snippet.contains("<b>pets</b>"));
        assert!(hit.score > 0.0);
    }
}

#[test]
fn ranking_is_repeatable() {
    let archive = Archive::new(MemoryStore::new(), &EngineConfig::default());
    archive.index(&page("a", "Rust book", "rust ownership borrowing")).unwrap();
    archive.index(&page("b", "Garden", "rust on garden tools")).unwrap();
    archive.index(&page("c", "Rust", "rust rust compiler")).unwrap();
    let ids = |r: pagevault_core::SearchResults| r.hits.into_iter().map(|h| h.id).collect::<Vec<_>>();
    let first = ids(archive.search("rust compiler", 10).unwrap());
    for _ in 0..3 {
        assert_eq!(ids(archive.search("rust compiler", 10).unwrap()), first);
    }
    assert_eq!(first[0], 2);
}

#[test]
fn archive_runs_on_sled() {
    let dir = tempfile::tempdir().unwrap();
    let kv = SledStore::open(dir.path()).unwrap();
    let archive = Archive::new(&kv, &EngineConfig::default());
    archive.index(&page("http://example.com", "Example", "persistent pages")).unwrap();
    kv.flush().unwrap();
    let results = archive.search("persistent", 5).unwrap();
    assert_eq!(results.hits.len(), 1);
    assert_eq!(results.hits[0].url, "http://example.com");
    assert_eq!(results.hits[0].title, "Example");
    assert_eq!(archive.store().count().unwrap(), 1);
}

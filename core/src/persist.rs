use crate::index::{DocId, Document, WordRecord};
use anyhow::Result;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Minimal key-value substrate: single-key get/set, no transactions.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// On-disk store backed by a sled tree.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Throwaway database removed on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.insert(key.as_bytes(), value)?;
        Ok(())
    }
}

/// In-process store, mostly for tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Copy of every key/value pair, for comparing store states.
    pub fn snapshot(&self) -> HashMap<String, Vec<u8>> { self.map.lock().clone() }

    pub fn is_empty(&self) -> bool { self.map.lock().is_empty() }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> { Ok(self.map.lock().get(key).cloned()) }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.map.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> { (**self).get(key) }
    fn set(&self, key: &str, value: &[u8]) -> Result<()> { (**self).set(key, value) }
}

pub const COUNT_KEY: &str = "COUNT";
pub const VOCABULARY_KEY: &str = "ALL";

fn url_key(url: &str) -> String { format!("URL-{url}") }
fn id_key(id: DocId) -> String { format!("ID-{id}") }
fn word_key(word: &str) -> String { format!("W-{word}") }

/// Typed view of the archive key layout.
///
/// Documents, ids and the counter are stored as JSON; word records, which are
/// the bulk of the data, are stored with bincode.
pub struct Store<S> {
    kv: S,
}

impl<S: KvStore> Store<S> {
    pub fn new(kv: S) -> Self { Self { kv } }

    pub fn kv(&self) -> &S { &self.kv }

    pub fn document(&self, url: &str) -> Result<Option<Document>> { self.get_json(&url_key(url)) }

    pub fn put_document(&self, doc: &Document) -> Result<()> { self.set_json(&url_key(&doc.url), doc) }

    pub fn url_for_id(&self, id: DocId) -> Result<Option<String>> { self.get_json(&id_key(id)) }

    pub fn put_url_for_id(&self, id: DocId, url: &str) -> Result<()> { self.set_json(&id_key(id), &url) }

    pub fn document_by_id(&self, id: DocId) -> Result<Option<Document>> {
        match self.url_for_id(id)? {
            Some(url) => self.document(&url),
            None => Ok(None),
        }
    }

    /// Next id to assign; zero for a fresh store.
    pub fn count(&self) -> Result<DocId> { Ok(self.get_json(COUNT_KEY)?.unwrap_or(0)) }

    pub fn put_count(&self, count: DocId) -> Result<()> { self.set_json(COUNT_KEY, &count) }

    pub fn word_record(&self, word: &str) -> Result<Option<WordRecord>> {
        let key = word_key(word);
        let Some(bytes) = self.kv.get(&key)? else { return Ok(None) };
        match bincode::deserialize(&bytes) {
            Ok(rec) => Ok(Some(rec)),
            Err(err) => {
                tracing::warn!(%key, %err, "undecodable word record treated as absent");
                Ok(None)
            }
        }
    }

    pub fn put_word_record(&self, word: &str, record: &WordRecord) -> Result<()> {
        let bytes = bincode::serialize(record)?;
        self.kv.set(&word_key(word), &bytes)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.kv.get(key)? else { return Ok(None) };
        match serde_json::from_slice(&bytes) {
            Ok(v) => Ok(Some(v)),
            Err(err) => {
                tracing::warn!(%key, %err, "undecodable record treated as absent");
                Ok(None)
            }
        }
    }

    pub(crate) fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.kv.set(key, &bytes)
    }
}

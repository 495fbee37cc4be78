//! Indexing and retrieval core of a personal page archive.
//!
//! Scanned pages become word postings in a key-value store; free-text queries
//! are scored per field, normalized, combined and rendered as highlighted
//! snippets.

pub mod config;
pub mod highlight;
pub mod index;
pub mod indexer;
pub mod persist;
pub mod query;
pub mod rank;
pub mod search;
pub mod tokenizer;
pub mod vocab;

pub use config::EngineConfig;
pub use index::{DocId, DocPostings, Document, Field, Position, ScanRecord, WordRecord};
pub use persist::{KvStore, MemoryStore, SledStore, Store};
pub use search::{Archive, SearchHit, SearchResults};

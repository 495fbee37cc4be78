use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type DocId = u32;
/// 1-based raw token slot within one field's text.
pub type Position = u32;

/// The text channels indexed per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Selection,
    Title,
    Priority,
    Content,
}

impl Field {
    /// Indexing order used for every scan record.
    pub const ALL: [Field; 4] = [Field::Selection, Field::Title, Field::Priority, Field::Content];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Selection => "selection",
            Field::Title => "title",
            Field::Priority => "priority",
            Field::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Stored page, keyed by url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// Position lists of one word within one document, per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocPostings {
    pub selection: Option<Vec<Position>>,
    pub title: Option<Vec<Position>>,
    pub priority: Option<Vec<Position>>,
    pub content: Option<Vec<Position>>,
}

impl DocPostings {
    pub fn get(&self, field: Field) -> Option<&[Position]> {
        let slot = match field {
            Field::Selection => &self.selection,
            Field::Title => &self.title,
            Field::Priority => &self.priority,
            Field::Content => &self.content,
        };
        slot.as_deref()
    }

    /// Replaces the list for `field` wholesale; other fields are left alone.
    pub fn set(&mut self, field: Field, positions: Vec<Position>) {
        let slot = match field {
            Field::Selection => &mut self.selection,
            Field::Title => &mut self.title,
            Field::Priority => &mut self.priority,
            Field::Content => &mut self.content,
        };
        *slot = Some(positions);
    }
}

/// All postings of a single word across documents and fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub docs: BTreeMap<DocId, DocPostings>,
}

impl WordRecord {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, doc_id: DocId) -> Option<&DocPostings> { self.docs.get(&doc_id) }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ { self.docs.keys().copied() }

    pub fn set(&mut self, doc_id: DocId, field: Field, positions: Vec<Position>) {
        self.docs.entry(doc_id).or_default().set(field, positions);
    }
}

/// Structured output of the page scanner handed to the indexer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub url: String,
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl ScanRecord {
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Selection => self.selection.as_deref(),
            Field::Title => self.title.as_deref(),
            Field::Priority => self.priority.as_deref(),
            Field::Content => self.content.as_deref(),
        }
    }
}

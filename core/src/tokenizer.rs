use crate::index::Position;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^0-9A-Za-z_]+").expect("valid regex");
}

/// Words shorter than this are never indexed or scored.
pub const MIN_WORD_LEN: usize = 3;

const ENGLISH: &[&str] = &[
    "able","about","above","across","after","again","against","all","almost","also","among","and","any","are","aren","because",
    "been","before","being","below","between","both","but","can","cannot","could","couldn","dear","did","didn","does","doesn",
    "doing","don","down","during","each","either","else","ever","every","few","for","from","further","get","got","had","hadn",
    "has","hasn","have","haven","having","her","here","hers","herself","him","himself","his","how","however","into","isn","its",
    "itself","just","least","let","like","likely","may","might","more","most","must","mustn","myself","neither","nor","not","off",
    "often","once","only","other","ought","our","ours","ourselves","out","over","own","rather","said","same","say","says","she",
    "should","shouldn","since","some","such","than","that","the","their","theirs","them","themselves","then","there","these",
    "they","this","those","through","tis","too","twas","under","until","very","wants","was","wasn","were","weren","what","when",
    "where","which","while","who","whom","why","will","with","won","would","wouldn","yet","you","your","yours","yourself",
    "yourselves",
];

/// Immutable set of uninteresting words, lower-cased.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { words: words.into_iter().map(|w| w.as_ref().to_ascii_lowercase()).collect() }
    }

    /// The built-in English list.
    pub fn english() -> Self { Self::new(ENGLISH.iter()) }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words.extend(extra.into_iter().map(|w| w.as_ref().to_ascii_lowercase()));
        self
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    /// Whether a lower-cased word is long enough and not a stopword.
    pub fn is_indexable(&self, word: &str) -> bool { word.len() >= MIN_WORD_LEN && !self.contains(word) }
}

impl Default for Stopwords {
    fn default() -> Self { Self::english() }
}

/// Word -> ascending positions.
pub type WordPositions = BTreeMap<String, Vec<Position>>;

/// Raw tokens in order, including the empty slots produced by leading or trailing delimiters.
pub fn raw_tokens(text: &str) -> impl Iterator<Item = &str> { NON_WORD.split(text) }

/// Build the per-word position lists for a text.
///
/// Positions count every raw token, kept or not, starting at 1.
pub fn extract(text: &str, stopwords: &Stopwords) -> WordPositions {
    let mut index = WordPositions::new();
    for (i, token) in raw_tokens(text).enumerate() {
        let lc = token.to_ascii_lowercase();
        if !stopwords.is_indexable(&lc) { continue; }
        index.entry(lc).or_default().push(i as Position + 1);
    }
    index
}

/// Split a free-text query the same way indexed text is split.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_ascii_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

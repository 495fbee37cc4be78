use crate::highlight::HighlightOptions;
use crate::rank::{Weights, DEFAULT_FALLBACK};
use crate::tokenizer::Stopwords;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tunables shared by the indexer and the query side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: Weights,
    pub highlight: HighlightOptions,
    /// Value every candidate gets when a signal cannot tell them apart.
    pub fallback: f64,
    /// Added to the built-in English stopwords.
    pub extra_stopwords: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            highlight: HighlightOptions::default(),
            fallback: DEFAULT_FALLBACK,
            extra_stopwords: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file; missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&buf).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn stopwords(&self) -> Stopwords { Stopwords::english().with_extra(&self.extra_stopwords) }
}

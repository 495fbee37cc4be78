use crate::index::{DocId, Field};
use crate::query::Scores;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK: f64 = 0.5;

/// Rescale scores into [0, 1] with 1 = best.
///
/// `multiplier` is applied first (pass -1 for lower-is-better metrics). When all
/// scaled scores are equal every id gets `fallback`.
pub fn normalize(scores: &Scores, multiplier: f64, fallback: f64) -> Scores {
    let scaled: Scores = scores.iter().map(|(&id, &s)| (id, s * multiplier)).collect();
    let Some(low) = scaled.values().copied().reduce(f64::min) else { return Scores::new() };
    let high = scaled.values().copied().fold(low, f64::max);
    if high == low {
        return scaled.into_keys().map(|id| (id, fallback)).collect();
    }
    let spread = high - low;
    scaled.into_iter().map(|(id, s)| (id, (s - low) / spread)).collect()
}

/// Relative importance of each ranking signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub coverage: f64,
    pub selection: f64,
    pub title: f64,
    pub priority: f64,
    pub content: f64,
}

impl Default for Weights {
    fn default() -> Self { Self { coverage: 1.0, selection: 1.0, title: 1.0, priority: 1.0, content: 1.0 } }
}

impl Weights {
    pub fn field(&self, field: Field) -> f64 {
        match field {
            Field::Selection => self.selection,
            Field::Title => self.title,
            Field::Priority => self.priority,
            Field::Content => self.content,
        }
    }
}

/// Weighted sum of normalized signals. Ids missing from a signal get nothing from it.
pub fn aggregate<'a, I>(signals: I) -> Scores
where
    I: IntoIterator<Item = (f64, &'a Scores)>,
{
    let mut totals = Scores::new();
    for (weight, scores) in signals {
        for (&id, &s) in scores {
            *totals.entry(id).or_insert(0.0) += weight * s;
        }
    }
    totals
}

/// Documents sharing one total score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankGroup {
    pub score: f64,
    pub ids: Vec<DocId>,
}

/// Group totals by score, best first. Ids inside a group are ascending.
pub fn rank(totals: &Scores) -> Vec<RankGroup> {
    let mut ordered: Vec<(DocId, f64)> = totals.iter().map(|(&id, &s)| (id, s)).collect();
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut groups: Vec<RankGroup> = Vec::new();
    for (id, score) in ordered {
        match groups.last_mut() {
            Some(group) if group.score == score => group.ids.push(id),
            _ => groups.push(RankGroup { score, ids: vec![id] }),
        }
    }
    groups
}

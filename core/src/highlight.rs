use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Snippet shaping knobs. Lengths are in characters of the escaped text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Output length after which no further segments are added.
    pub budget: usize,
    /// Edge segments longer than this are cut; interior ones at twice this.
    pub max_segment: usize,
    pub matches_per_term: usize,
    pub open_tag: String,
    pub close_tag: String,
    pub ellipsis: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            budget: 200,
            max_segment: 50,
            matches_per_term: 3,
            open_tag: "<b>".to_string(),
            close_tag: "</b>".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

/// Escaped text as chars, with a flag marking chars that belong to an entity.
struct Escaped {
    chars: Vec<char>,
    in_entity: Vec<bool>,
}

/// Escape markup so it renders literally inside an element.
fn escape_html(text: &str) -> Escaped {
    let mut chars = Vec::with_capacity(text.len());
    let mut in_entity = Vec::with_capacity(text.len());
    for c in text.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            _ => {
                chars.push(c);
                in_entity.push(false);
                continue;
            }
        };
        chars.extend(entity.chars());
        in_entity.extend(std::iter::repeat(true).take(entity.len()));
    }
    Escaped { chars, in_entity }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Match {
    start: usize,
    len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    options: HighlightOptions,
}

impl Highlighter {
    pub fn new(options: HighlightOptions) -> Self { Self { options } }

    /// Escape `text` and wrap the first few occurrences of each term.
    ///
    /// With `truncate`, long stretches between matches are shortened; without
    /// it segments are emitted whole (used for titles).
    pub fn highlight(&self, text: &str, terms: &[String], truncate: bool) -> String {
        let Escaped { chars: escaped, in_entity } = escape_html(text);
        let matches = self.find_matches(&escaped, &in_entity, terms);
        let opts = &self.options;

        let mut out = String::new();
        let mut size = 0;
        let mut pos = 0;
        let mut i = 0;
        let n = matches.len();
        while size < opts.budget && i <= n {
            let segment = if i < n { &escaped[pos..matches[i].start] } else { &escaped[pos..] };
            let segment = if truncate { self.shorten(segment, i == 0, i == n) } else { segment.iter().collect() };
            size += segment.chars().count();
            out.push_str(&segment);

            if let Some(m) = matches.get(i) {
                out.push_str(&opts.open_tag);
                out.extend(&escaped[m.start..m.start + m.len]);
                out.push_str(&opts.close_tag);
                size += m.len;
                pos = m.start + m.len;
            }
            i += 1;
        }

        if size >= opts.budget && i <= n {
            out.push(' ');
            out.push_str(&opts.ellipsis);
        }
        out
    }

    /// Accepted matches in text order. A match must not touch an ASCII letter on
    /// either side (digits and underscores are not checked) and must not overlap
    /// an escaped entity.
    fn find_matches(&self, text: &[char], in_entity: &[bool], terms: &[String]) -> Vec<Match> {
        let lower: Vec<char> = text.iter().map(char::to_ascii_lowercase).collect();
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for term in terms {
            let needle: Vec<char> = term.chars().map(|c| c.to_ascii_lowercase()).collect();
            let len = needle.len();
            if len <= 2 || !seen.insert(needle.clone()) { continue; }

            let mut count = 0;
            let mut pos = 0;
            while count < self.options.matches_per_term {
                let Some(p) = find_from(&lower, &needle, pos) else { break };
                let before = p.checked_sub(1).map(|b| lower[b]);
                let after = lower.get(p + len).copied();
                let bounded = !before.is_some_and(|c| c.is_ascii_alphabetic()) && !after.is_some_and(|c| c.is_ascii_alphabetic());
                if bounded && !in_entity[p..p + len].contains(&true) {
                    count += 1;
                    found.push(Match { start: p, len });
                }
                pos = p + len;
            }
        }

        // Same start: the longer term wins. Overlapping later matches are dropped.
        found.sort_by(|a, b| a.start.cmp(&b.start).then(b.len.cmp(&a.len)));
        let mut kept: Vec<Match> = Vec::with_capacity(found.len());
        for m in found {
            if kept.last().map_or(true, |last| m.start >= last.start + last.len) {
                kept.push(m);
            }
        }
        kept
    }

    fn shorten(&self, segment: &[char], first: bool, last: bool) -> String {
        let max = self.options.max_segment;
        let ellipsis = &self.options.ellipsis;
        let len = segment.len();
        let text = |s: &[char]| s.iter().collect::<String>();

        if last {
            if len > max {
                let keep = max.saturating_sub(4);
                return format!("{} {ellipsis}", text(&segment[..keep]));
            }
        } else if first {
            if len > max {
                let keep = max.saturating_sub(4);
                return format!("{ellipsis} {}", text(&segment[len - keep..]));
            }
        } else if len > max * 2 {
            let keep = max.saturating_sub(3);
            return format!("{} {ellipsis} {}", text(&segment[..keep]), text(&segment[len - keep..]));
        }
        text(segment)
    }
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || from + needle.len() > haystack.len() { return None; }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

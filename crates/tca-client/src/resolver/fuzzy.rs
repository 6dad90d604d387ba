//! Jaro-Winkler ranking for "did you mean" suggestions
//!
//! Scores are only ever reported back to the caller inside a `NotFound` error.

use crate::error::{FuzzyMatch, Suggestions};

/// Candidates must score strictly above this to be suggested
pub const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 5;
const PREFIX_SCALE: f64 = 0.1;
const MAX_PREFIX: usize = 4;

/// Jaro similarity in `0.0..=1.0`
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count() / 2;

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0
}

/// Jaro similarity boosted by the length of the common prefix (up to four chars)
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let sim = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    sim + prefix as f64 * PREFIX_SCALE * (1.0 - sim)
}

/// Rank `candidates` against `query`, case-insensitively, best first
pub fn suggest<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> Suggestions {
    let needle = query.to_lowercase();
    let mut ranked: Vec<FuzzyMatch> = Vec::new();
    for candidate in candidates {
        if candidate.is_empty() || ranked.iter().any(|m| m.name == candidate) {
            continue;
        }
        let score = jaro_winkler(&needle, &candidate.to_lowercase());
        if score > SUGGESTION_THRESHOLD {
            ranked.push(FuzzyMatch {
                name: candidate.to_string(),
                score,
            });
        }
    }
    ranked.sort_by(|x, y| y.score.total_cmp(&x.score).then_with(|| x.name.cmp(&y.name)));
    ranked.truncate(MAX_SUGGESTIONS);
    Suggestions(ranked)
}

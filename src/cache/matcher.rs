//! Fuzzy Matcher Module
//!
//! Match-normalization and Levenshtein similarity used to find a cached
//! query that is phrased differently from the incoming one.

use std::collections::HashSet;

use crate::cache::DEFAULT_STOPWORDS;

// == Query Normalizer ==
/// Lossy text transform applied only for similarity scoring.
///
/// Lowercases, strips punctuation, drops stopwords and collapses whitespace.
/// The normalized form is never used as a storage key.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    stopwords: HashSet<String>,
}

impl QueryNormalizer {
    /// Creates a normalizer with the given stopword denylist.
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    // == Normalize ==
    /// Returns the match-normalized form of `text`.
    ///
    /// Punctuation is removed rather than replaced, so "kid's" becomes "kids".
    pub fn normalize(&self, text: &str) -> String {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        cleaned
            .split_whitespace()
            .filter(|word| !self.stopwords.contains(*word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns true if `word` is on the denylist.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter())
    }
}

// == Edit Distance ==
/// Classic Levenshtein distance over chars (insert, delete, substitute each cost 1).
///
/// Uses the full `(m + 1) x (n + 1)` matrix.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a.len()][b.len()]
}

// == Similarity ==
/// Normalized similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
///
/// Two empty strings are identical (similarity 1).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

// == Best Match ==
/// Best scoring candidate from a fuzzy scan.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a> {
    /// The stored key that scored highest
    pub key: &'a str,
    /// Its similarity to the query
    pub similarity: f64,
}

/// Scans `candidates` for the key most similar to `query`.
///
/// Both sides are normalized with `normalizer`. Ties keep the first
/// candidate seen. Returns `None` if the best score is below `threshold`
/// or there are no candidates.
pub fn best_match<'a, I>(
    normalizer: &QueryNormalizer,
    query: &str,
    candidates: I,
    threshold: f64,
) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalizer.normalize(query);
    let mut best: Option<FuzzyMatch<'a>> = None;

    for key in candidates {
        let score = similarity(&normalized_query, &normalizer.normalize(key));
        if best.as_ref().map_or(true, |b| score > b.similarity) {
            best = Some(FuzzyMatch {
                key,
                similarity: score,
            });
        }
    }

    best.filter(|m| m.similarity >= threshold)
}

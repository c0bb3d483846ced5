use std::collections::BTreeSet;

/// Minimum number of characters a token needs to take part in comparison.
const MIN_TOKEN_CHARS: usize = 3;

/// Normalize free text for comparison: lowercase, replace punctuation with spaces,
/// and collapse multiple spaces.
pub fn normalize_for_comparison(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut space_pending = false;

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                normalized.push(lower);
            }
            space_pending = false;
        } else if !space_pending {
            normalized.push(' ');
            space_pending = true;
        }
    }

    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into comparable words, dropping anything shorter than three characters.
/// Order and repeats are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_for_comparison(text)
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(|token| token.to_string())
        .collect()
}

pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Jaccard index of two token sets. Two empty sets score 0: no shared words
/// is no evidence of similarity.
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Word-overlap similarity of two strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    jaccard_similarity(&token_set(a), &token_set(b))
}

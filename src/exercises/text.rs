//! Text helpers shared by the sanitizer, validator, and grader

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// First single-quoted span in a prompt, straight or typographic quotes
static QUOTED_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"['‘‚]([^'’‘]+)['’]").unwrap());

/// Words of a sentence with surrounding punctuation removed, case kept
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Case- and punctuation-insensitive tokens
pub fn tokens(text: &str) -> Vec<String> {
    words(text).into_iter().map(|w| w.to_lowercase()).collect()
}

/// Token multiset of a sentence
pub fn token_counts<I, S>(parts: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = HashMap::new();
    for part in parts {
        for token in tokens(part.as_ref()) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }
    counts
}

/// Canonical form for comparing a learner's answer: trimmed, lowercased,
/// inner whitespace collapsed
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether two answers are equal once normalized
pub fn same_answer(a: &str, b: &str) -> bool {
    normalize_answer(a) == normalize_answer(b)
}

/// Sentence under test in an error-detection prompt, if quoted
pub fn extract_quoted_sentence(prompt: &str) -> Option<String> {
    QUOTED_SENTENCE
        .captures(prompt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

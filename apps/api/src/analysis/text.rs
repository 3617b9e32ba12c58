//! Text normalization, tokenization and frequency keywords.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s@.\-+#/]").expect("Invalid character-class regex"));

/// English stop words, sorted for binary search.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may",
    "me", "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "us", "very", "was", "we",
    "well", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "within", "would", "you", "your", "yours",
];

/// Single-character tokens that are real skills.
const SHORT_SKILLS: &[&str] = &["c", "r"];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

/// Collapses whitespace and strips everything except word characters,
/// whitespace and `@ . - + # /`.
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Lower-cased word tokens with stop words removed.
///
/// `+`, `#` and inner `.` stay part of a token so `c++`, `c#` and `node.js`
/// survive intact; trailing sentence punctuation does not.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|raw| raw.trim_matches('.'))
        .filter(|token| !token.is_empty())
        .filter(|token| token.chars().any(|c| c.is_alphabetic()))
        .filter(|token| token.chars().count() > 1 || SHORT_SKILLS.contains(token))
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Top `limit` tokens by frequency; ties break alphabetically so output is stable.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut freq: HashMap<String, u32> = HashMap::new();
    for token in tokenize(text) {
        if token.chars().count() > 2 {
            *freq.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u32)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

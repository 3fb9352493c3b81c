//! Tokenization and keyword extraction.
//!
//! Both the TF-IDF corpus pass and the keyword extractor share the same
//! character pipeline (lowercase, strip to `[a-z0-9_]`, split on whitespace)
//! but keep distinct stopword lists and length bounds.

/// Stopwords filtered from TF-IDF tokens. Common English function words and
/// pronouns; content words survive.
pub const TFIDF_STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "and", "any", "are", "been", "before",
    "being", "below", "between", "both", "but", "can", "could", "did", "does", "doing", "down",
    "during", "each", "few", "for", "from", "further", "had", "has", "have", "having", "her",
    "here", "hers", "him", "his", "how", "into", "its", "just", "let", "more", "most", "nor",
    "not", "now", "off", "once", "only", "other", "our", "ours", "out", "over", "own", "same",
    "she", "should", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "too", "under", "until", "very", "was",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your", "yours",
];

/// Narrower stopword list used by the keyword extractor. Kept separate from
/// the TF-IDF list on purpose; the two passes tolerate different noise.
pub const KEYWORD_STOPWORDS: &[&str] = &[
    "and", "are", "but", "can", "could", "did", "does", "for", "from", "had", "has", "have",
    "how", "its", "may", "might", "not", "our", "she", "should", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "was", "were", "what", "when", "where", "which",
    "who", "why", "will", "with", "would", "you", "your",
];

/// Token length bounds for the TF-IDF pass.
const MIN_TOKEN_LEN: usize = 3;
const MAX_TOKEN_LEN: usize = 49;

/// Keyword length upper bound (narrower than the TF-IDF bound).
const MAX_KEYWORD_LEN: usize = 40;

/// Lowercase `text` and map every character outside `[a-z0-9_]` to a space.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Tokenize text for TF-IDF scoring: lowercase word tokens of length 3..=49
/// with stopwords removed. Pure and deterministic.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && t.len() <= MAX_TOKEN_LEN)
        .filter(|t| !TFIDF_STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Extract query keywords: same pipeline as [`tokenize`] but with the
/// narrower stopword list, a 40-char bound, and de-duplication preserving
/// first occurrence.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    normalize(text)
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && t.len() <= MAX_KEYWORD_LEN)
        .filter(|t| !KEYWORD_STOPWORDS.contains(t))
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

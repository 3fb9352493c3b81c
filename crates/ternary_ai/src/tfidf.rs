//! TF-IDF scoring over the candidate corpus.
//!
//! The index is built once per selection call. IDF uses add-one smoothing
//! in the denominator (`ln(N / (1 + df))`), term frequency is the raw count
//! normalized by document token length, and a document's score against a
//! query is the sum of `tf * idf` over distinct query tokens.

use std::collections::{HashMap, HashSet};

/// Precomputed IDF values and per-document term frequencies.
pub struct TfIdfIndex {
    idf: HashMap<String, f64>,
    doc_tf: Vec<HashMap<String, f64>>,
}

impl TfIdfIndex {
    /// Build the index from tokenized documents.
    ///
    /// Cost is linear in the total token count plus the vocabulary size.
    pub fn build(docs: &[Vec<String>]) -> Self {
        let n = docs.len() as f64;

        // Document frequency per term.
        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let idf = df
            .into_iter()
            .map(|(term, count)| (term.to_string(), (n / (1.0 + count as f64)).ln()))
            .collect();

        // Normalized term frequency per document.
        let doc_tf = docs
            .iter()
            .map(|doc| {
                let len = doc.len() as f64;
                let mut counts: HashMap<String, f64> = HashMap::new();
                for token in doc {
                    *counts.entry(token.clone()).or_insert(0.0) += 1.0;
                }
                if len > 0.0 {
                    for value in counts.values_mut() {
                        *value /= len;
                    }
                }
                counts
            })
            .collect();

        Self { idf, doc_tf }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_tf.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_tf.is_empty()
    }

    /// IDF for a term; zero for terms outside the corpus vocabulary.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    /// Score a document against the query tokens.
    ///
    /// Sums `tf * idf` over distinct query tokens; terms missing from the
    /// document or the vocabulary contribute zero.
    pub fn score(&self, doc_idx: usize, query_tokens: &[String]) -> f64 {
        let Some(tf) = self.doc_tf.get(doc_idx) else {
            return 0.0;
        };

        let distinct: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
        distinct
            .into_iter()
            .map(|term| tf.get(term).copied().unwrap_or(0.0) * self.idf(term))
            .sum()
    }
}

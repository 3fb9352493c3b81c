//! Embedding-based relevance scoring.
//!
//! The query is embedded once; each candidate's vector comes from the
//! on-disk cache when fresh, otherwise from the provider (with write-back).
//! A failed query embedding aborts the whole scorer so the engine can fall
//! back to TF-IDF; failed document embeddings only cost that document its
//! similarity score.

use futures::StreamExt;
use tracing::warn;

use crate::cache::EmbeddingCache;
use crate::providers::{Embedder, EmbedderError};
use crate::types::FileCandidate;

/// Upper bound on in-flight embedding requests per selection call.
/// Unbounded fan-out over a large corpus would saturate the provider.
const MAX_CONCURRENT_EMBEDDINGS: usize = 4;

/// Cosine similarity `dot(a,b) / (|a|·|b|)`.
///
/// Returns `0.0` when the vectors differ in dimension or either has zero
/// magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut mag_a = 0.0_f64;
    let mut mag_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        mag_a += f64::from(x) * f64::from(x);
        mag_b += f64::from(y) * f64::from(y);
    }

    let mag = mag_a.sqrt() * mag_b.sqrt();
    if mag == 0.0 {
        return 0.0;
    }
    dot / mag
}

/// Scores candidates by embedding similarity to the query.
pub struct EmbeddingScorer<'a> {
    embedder: &'a dyn Embedder,
    cache: &'a EmbeddingCache,
}

impl<'a> EmbeddingScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder, cache: &'a EmbeddingCache) -> Self {
        Self { embedder, cache }
    }

    /// Score every candidate against `query`.
    ///
    /// Returns `Err` only when the query embedding itself fails; the engine
    /// treats that as a whole-call fallback to TF-IDF. Per-candidate
    /// failures are logged and leave that candidate's score untouched.
    pub async fn score(
        &self,
        candidates: &mut [FileCandidate],
        query: &str,
    ) -> Result<(), EmbedderError> {
        let query_vector = self.embedder.embed(query).await?;

        let lookups = candidates.iter().enumerate().map(|(idx, candidate)| {
            let path = candidate.file.path.clone();
            let content = candidate.file.content.clone();
            let mtime_ms = candidate.mtime_ms;
            async move { (idx, self.embed_document(&path, &content, mtime_ms).await) }
        });

        let results: Vec<(usize, Option<Vec<f32>>)> = futures::stream::iter(lookups)
            .buffer_unordered(MAX_CONCURRENT_EMBEDDINGS)
            .collect()
            .await;

        // Re-apply in candidate order so output is deterministic regardless
        // of completion order.
        for (idx, vector) in results {
            if let Some(vector) = vector {
                let similarity = cosine_similarity(&query_vector, &vector);
                let candidate = &mut candidates[idx];
                candidate.score += similarity;
                candidate
                    .reasons
                    .push(format!("embedding similarity: {similarity:.3}"));
            }
        }

        Ok(())
    }

    /// Fetch a document vector: fresh cache entry, else provider + write-back.
    /// Files with unknown mtime skip the cache entirely.
    async fn embed_document(
        &self,
        path: &str,
        content: &str,
        mtime_ms: Option<u64>,
    ) -> Option<Vec<f32>> {
        if let Some(mtime) = mtime_ms {
            if let Some(vector) = self.cache.get(path, content, mtime) {
                return Some(vector);
            }
        }

        match self.embedder.embed(content).await {
            Ok(vector) => {
                if let Some(mtime) = mtime_ms {
                    self.cache.set(path, content, mtime, &vector);
                }
                Some(vector)
            }
            Err(e) => {
                warn!("Embedding failed for {path}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ternary_fs::CodebaseFile;

    // -- Cosine similarity ---------------------------------------------------

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = [1.0_f32, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_have_similarity_minus_one() {
        let sim = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]);
        assert!((sim + 1.0).abs() < 1e-9);
    }

    #[test]
    fn dimension_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn zero_magnitude_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    // -- Scorer --------------------------------------------------------------

    /// Embedder returning a fixed vector per exact text, with a call counter.
    struct StubEmbedder {
        calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn vector_for(text: &str) -> Vec<f32> {
            // Deterministic toy embedding: counts of a few marker words.
            let lower = text.to_lowercase();
            vec![
                lower.matches("theme").count() as f32,
                lower.matches("chart").count() as f32,
                1.0,
            ]
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Self::vector_for(text))
        }
    }

    /// Embedder whose every call fails.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedderError> {
            Err(EmbedderError::Network("connection refused".into()))
        }
    }

    fn candidate(path: &str, content: &str, mtime_ms: Option<u64>) -> FileCandidate {
        FileCandidate {
            file: CodebaseFile {
                path: path.into(),
                content: content.into(),
                force: false,
            },
            score: 0.0,
            reasons: Vec::new(),
            is_auto_include: false,
            tokens: 1,
            mtime_ms,
        }
    }

    fn test_cache() -> (tempfile::TempDir, EmbeddingCache) {
        let tmp = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::new(tmp.path().join("cache"));
        (tmp, cache)
    }

    #[tokio::test]
    async fn scores_candidates_by_similarity() {
        let (_tmp, cache) = test_cache();
        let embedder = StubEmbedder::new();
        let scorer = EmbeddingScorer::new(&embedder, &cache);

        let mut candidates = vec![
            candidate("src/Theme.tsx", "theme theme theme", Some(1)),
            candidate("src/Chart.tsx", "chart chart chart", Some(2)),
        ];
        scorer
            .score(&mut candidates, "theme related question")
            .await
            .unwrap();

        assert!(candidates[0].score > candidates[1].score);
        assert!(candidates[0]
            .reasons
            .iter()
            .any(|r| r.starts_with("embedding similarity:")));
    }

    #[tokio::test]
    async fn query_failure_aborts_scorer() {
        let (_tmp, cache) = test_cache();
        let embedder = FailingEmbedder;
        let scorer = EmbeddingScorer::new(&embedder, &cache);

        let mut candidates = vec![candidate("src/a.ts", "content", Some(1))];
        let err = scorer.score(&mut candidates, "query").await;
        assert!(err.is_err());
        assert_eq!(candidates[0].score, 0.0);
        assert!(candidates[0].reasons.is_empty());
    }

    #[tokio::test]
    async fn cache_hit_skips_provider_call() {
        let (_tmp, cache) = test_cache();
        let embedder = StubEmbedder::new();

        // Pre-populate the cache with the vector the stub would produce.
        cache.set("src/a.ts", "theme file", 42, &StubEmbedder::vector_for("theme file"));

        let scorer = EmbeddingScorer::new(&embedder, &cache);
        let mut candidates = vec![candidate("src/a.ts", "theme file", Some(42))];
        scorer.score(&mut candidates, "theme").await.unwrap();

        // Only the query was embedded.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert!(candidates[0].score > 0.0);
    }

    #[tokio::test]
    async fn cache_miss_embeds_and_writes_back() {
        let (_tmp, cache) = test_cache();
        let embedder = StubEmbedder::new();
        let scorer = EmbeddingScorer::new(&embedder, &cache);

        let mut candidates = vec![candidate("src/a.ts", "theme file", Some(42))];
        scorer.score(&mut candidates, "theme").await.unwrap();

        // Query + one document.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.get("src/a.ts", "theme file", 42),
            Some(StubEmbedder::vector_for("theme file"))
        );
    }

    #[tokio::test]
    async fn unknown_mtime_skips_cache() {
        let (_tmp, cache) = test_cache();
        let embedder = StubEmbedder::new();
        let scorer = EmbeddingScorer::new(&embedder, &cache);

        let mut candidates = vec![candidate("src/a.ts", "theme file", None)];
        scorer.score(&mut candidates, "theme").await.unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.entry_count(), 0);
        assert!(candidates[0].score > 0.0);
    }

    #[tokio::test]
    async fn results_apply_in_candidate_order() {
        let (_tmp, cache) = test_cache();
        let embedder = StubEmbedder::new();
        let scorer = EmbeddingScorer::new(&embedder, &cache);

        let mut candidates: Vec<FileCandidate> = (0..20)
            .map(|i| candidate(&format!("src/f{i}.ts"), "theme", Some(i)))
            .collect();
        scorer.score(&mut candidates, "theme").await.unwrap();

        // Every candidate has the same content, so identical scores and
        // exactly one reason each, in order.
        for c in &candidates {
            assert_eq!(c.reasons.len(), 1);
            assert!((c.score - candidates[0].score).abs() < 1e-12);
        }
    }
}

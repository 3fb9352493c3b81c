//! Smart context selection for the Ternary coding assistant.
//!
//! Given a user prompt and a workspace of source files, this crate ranks
//! the files by relevance and packs the best of them into a token budget.
//! Scoring runs through embeddings (with a durable on-disk cache) when an
//! embedding provider is reachable, and falls back to in-memory TF-IDF
//! otherwise. Heuristic and keyword adjustments refine the base score, and
//! a mode-dependent selector enforces file caps and the budget.

/// Content-addressed on-disk embedding cache.
pub mod cache;
/// Engine orchestration: harvest, score, adjust, select.
pub mod context_engine;
/// Cosine similarity and the embedding-based scorer.
pub mod embedding;
/// Additive heuristic boosts and keyword post-adjustments.
pub mod heuristics;
/// Embedding provider trait and implementations.
pub mod providers;
/// Candidate preparation and budgeted selection.
pub mod selector;
/// TF-IDF index over the candidate corpus.
pub mod tfidf;
/// Tokenization, stopword filtering, and keyword extraction.
pub mod tokenize;
/// Input and result types for context selection.
pub mod types;

pub use cache::EmbeddingCache;
pub use context_engine::{FileScanner, SmartContextEngine, WorkspaceScanner};
pub use embedding::{cosine_similarity, EmbeddingScorer};
pub use providers::{Embedder, EmbedderError, OllamaEmbedder};
pub use tfidf::TfIdfIndex;
pub use types::{
    ChatContext, ChatMessage, FileCandidate, MessageRole, PromptContext, ScoringMethod,
    SelectOptions, SelectedFile, SelectionDebug, SelectionResult, SmartContextMode, TopScore,
};

pub use ternary_fs::CodebaseFile;

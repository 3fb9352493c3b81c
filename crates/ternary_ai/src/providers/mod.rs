//! Embedding provider trait and implementations.
//!
//! Each provider module exposes a struct that implements [`Embedder`].

pub mod ollama;

pub use ollama::OllamaEmbedder;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that any embedding provider may return.
#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("No embedding provider available")]
    Unavailable,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Embedding error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Unified interface for embedding backends.
///
/// One capability: turn a text into a fixed-dimension vector. A given
/// provider instance always returns vectors of the same dimension; callers
/// treat a dimension mismatch as zero similarity rather than an error.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Quick health-check (e.g. ping the API).
    async fn is_available(&self) -> bool;

    /// Embed a text into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;
}

//! Ollama embedder -- local embedding inference via the Ollama REST API.
//!
//! Requires no API key, so it is the default way to get semantic scoring
//! on a developer machine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Embedder, EmbedderError};

// ---------------------------------------------------------------------------
// Ollama API types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct OllamaEmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingsResponse {
    embedding: Option<Vec<f32>>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Ollama local embedding provider.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    /// Create a new embedder pointing at the given Ollama server.
    /// Defaults to `http://localhost:11434` when `None` is passed.
    pub fn new(base_url: Option<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| "http://localhost:11434".into()),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn name(&self) -> &str {
        "Ollama (Local)"
    }

    /// Ping `/api/tags` with a short timeout.
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
        {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                debug!("Ollama not reachable: {e}");
                false
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = OllamaEmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("Ollama embeddings returned {status}");
            return Err(EmbedderError::Other(format!(
                "Ollama embeddings returned {status}"
            )));
        }

        let data: OllamaEmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        match data.embedding {
            Some(embedding) if !embedding.is_empty() => Ok(embedding),
            _ => Err(EmbedderError::InvalidResponse(
                "empty embedding in response".into(),
            )),
        }
    }
}

//! Token accounting: estimation and model context-window sizes.

/// Rough token estimate: ~4 characters per token for English text and code.
/// Intentionally conservative (overestimates) to avoid budget overruns.
const CHARS_PER_TOKEN: usize = 4;

/// Estimate token count for a string.
pub fn estimate_tokens(text: &str) -> usize {
    // Character count / 4 as a rough approximation. More accurate would be
    // a real tokenizer, but this avoids a heavy dependency.
    text.len().div_ceil(CHARS_PER_TOKEN)
}

// ---------------------------------------------------------------------------
// Common model context sizes
// ---------------------------------------------------------------------------

/// Context window size for a known model id, or `None` when the model does
/// not report one. Callers apply their own fallback.
pub fn model_context_size(model_id: &str) -> Option<u32> {
    match model_id {
        // Anthropic
        "claude-opus-4" | "claude-sonnet-4" => Some(200_000),
        "claude-haiku-3.5" => Some(200_000),
        // OpenAI
        "gpt-4o" | "gpt-4o-mini" => Some(128_000),
        "o1" | "o1-mini" => Some(128_000),
        // Local
        "llama3.2" | "llama3.2:latest" => Some(128_000),
        "mistral" | "mistral:latest" => Some(32_000),
        "codellama" | "codellama:latest" => Some(16_000),
        _ => None,
    }
}

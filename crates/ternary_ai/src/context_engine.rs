//! Smart context engine.
//!
//! Orchestrates candidate harvesting, query building, base scoring
//! (embeddings with TF-IDF fallback), heuristic and keyword adjustments,
//! and budgeted selection into a single `select` operation with a full
//! debug trace.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use ternary_core::{estimate_tokens, model_context_size, SmartContextMode};
use ternary_fs::{scan_workspace, CodebaseFile, ScanOptions};

use crate::cache::EmbeddingCache;
use crate::embedding::EmbeddingScorer;
use crate::heuristics::{apply_heuristics, apply_keyword_adjustments};
use crate::providers::Embedder;
use crate::selector::{prepare_candidates, select_within_budget};
use crate::tfidf::TfIdfIndex;
use crate::tokenize::{extract_keywords, tokenize};
use crate::types::{
    ChatContext, FileCandidate, MessageRole, PromptContext, ScoringMethod, SelectOptions,
    SelectedFile, SelectionDebug, SelectionResult, TopScore,
};

/// Tokens reserved out of the model context for everything that is not file
/// context: system prompt (~2000), user prompt (~1000), output (~4000), and
/// safety margin (~1000).
const RESERVED_TOKENS: u32 = 8_000;

/// Floor for the derived token budget.
const MIN_TOKEN_BUDGET: u32 = 10_000;

/// Context size assumed for models that report none.
const FALLBACK_MODEL_TOKENS: u32 = 32_000;

/// How many selected files appear in the debug score table.
const TOP_SCORES_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// FileScanner
// ---------------------------------------------------------------------------

/// Provider of candidate files for a workspace.
pub trait FileScanner: Send + Sync {
    /// Harvest candidate files, honoring the chat's exclusions.
    fn extract(&self, app_path: &Path, chat: &ChatContext) -> Result<Vec<CodebaseFile>>;
}

/// Default scanner over the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceScanner {
    /// Base options; the chat's exclude paths are merged in per call.
    pub options: ScanOptions,
}

impl FileScanner for WorkspaceScanner {
    fn extract(&self, app_path: &Path, chat: &ChatContext) -> Result<Vec<CodebaseFile>> {
        let mut options = self.options.clone();
        for prefix in &chat.exclude_paths {
            options.exclude_paths.insert(prefix.clone());
        }
        scan_workspace(app_path, &options)
    }
}

// ---------------------------------------------------------------------------
// SmartContextEngine
// ---------------------------------------------------------------------------

/// Selects the workspace files most relevant to a prompt, within a token
/// budget.
pub struct SmartContextEngine {
    scanner: Arc<dyn FileScanner>,
    embedder: Option<Arc<dyn Embedder>>,
    cache: EmbeddingCache,
}

impl SmartContextEngine {
    /// Create an engine. Expired cache entries are evicted in the
    /// background when a tokio runtime is available.
    pub fn new(
        scanner: Arc<dyn FileScanner>,
        embedder: Option<Arc<dyn Embedder>>,
        cache: EmbeddingCache,
        max_cache_age: Duration,
    ) -> Self {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let cleanup_cache = cache.clone();
            handle.spawn(async move {
                cleanup_cache.cleanup(max_cache_age);
            });
        }

        Self {
            scanner,
            embedder,
            cache,
        }
    }

    /// Select context files for the given prompt and workspace.
    ///
    /// Always returns a result for well-formed inputs: embedding and cache
    /// failures degrade (recorded via `debug.scoring_method`), only scanner
    /// failure is an error.
    pub async fn select(&self, options: &SelectOptions) -> Result<SelectionResult> {
        let files = self.scanner.extract(&options.app_path, &options.chat)?;

        if options.mode == SmartContextMode::Off {
            return Ok(traditional_result(files));
        }

        let token_budget = options
            .token_budget
            .unwrap_or_else(|| derive_token_budget(&options.model));

        let mut candidates = prepare_candidates(files, &options.chat, &options.app_path);
        let total_candidates = candidates.len();

        let query = build_query(&options.prompt);
        let keywords = extract_keywords(&query);
        let now_ms = chrono::Utc::now().timestamp_millis().max(0) as u64;

        let scoring_method = self.apply_base_scores(&mut candidates, &query).await;

        apply_heuristics(&mut candidates, &keywords, &query, now_ms);
        apply_keyword_adjustments(&mut candidates, &keywords);

        // Stable sort: equal scores keep scanner order.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let auto_includes_count = candidates.iter().filter(|c| c.is_auto_include).count();
        let (selected, token_usage) =
            select_within_budget(candidates, token_budget, options.mode);

        debug!(
            "Smart context selected {}/{} files ({} tokens of {}) via {:?}",
            selected.len(),
            total_candidates,
            token_usage,
            token_budget,
            scoring_method
        );

        Ok(build_result(
            selected,
            total_candidates,
            token_usage,
            token_budget,
            scoring_method,
            auto_includes_count,
        ))
    }

    /// Run the base scorer: embeddings when a provider is reachable, else
    /// TF-IDF over the candidate corpus. A failed query embedding demotes
    /// the whole call to TF-IDF.
    async fn apply_base_scores(
        &self,
        candidates: &mut [FileCandidate],
        query: &str,
    ) -> ScoringMethod {
        if let Some(embedder) = &self.embedder {
            if embedder.is_available().await {
                let scorer = EmbeddingScorer::new(embedder.as_ref(), &self.cache);
                match scorer.score(candidates, query).await {
                    Ok(()) => return ScoringMethod::Embeddings,
                    Err(e) => {
                        warn!("Query embedding failed, falling back to TF-IDF: {e}");
                    }
                }
            }
        }

        let docs: Vec<Vec<String>> = candidates
            .iter()
            .map(|c| tokenize(&c.file.content))
            .collect();
        let index = TfIdfIndex::build(&docs);
        let query_tokens = tokenize(query);

        for (idx, candidate) in candidates.iter_mut().enumerate() {
            let score = index.score(idx, &query_tokens);
            if score != 0.0 {
                candidate.score += score;
                candidate.reasons.push(format!("tf-idf score: {score:.4}"));
            }
        }

        ScoringMethod::TfIdf
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The scoring query: the current prompt followed by the last three
/// user-role messages, in source order. Assistant and system messages are
/// ignored.
pub fn build_query(prompt: &PromptContext) -> String {
    let user_messages: Vec<&str> = prompt
        .recent_messages
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .collect();

    let start = user_messages.len().saturating_sub(3);
    let mut parts = vec![prompt.user_prompt.as_str()];
    parts.extend(&user_messages[start..]);
    parts.join(" ")
}

/// Derive the token budget from the model's context window, reserving room
/// for prompts and output.
fn derive_token_budget(model: &str) -> u32 {
    let model_max = model_context_size(model).unwrap_or(FALLBACK_MODEL_TOKENS);
    model_max.saturating_sub(RESERVED_TOKENS).max(MIN_TOKEN_BUDGET)
}

/// The `mode = off` path: every scanner file passes through untouched and
/// the budget is defined as whatever they cost.
fn traditional_result(files: Vec<CodebaseFile>) -> SelectionResult {
    let token_usage: u32 = files
        .iter()
        .map(|f| estimate_tokens(&f.content) as u32)
        .sum();
    let auto_includes_count = files.iter().filter(|f| f.force).count();
    let count = files.len();

    SelectionResult {
        selected_files: files.into_iter().map(SelectedFile::from).collect(),
        debug: SelectionDebug {
            total_candidates: count,
            selected_count: count,
            token_usage,
            token_budget: token_usage,
            scoring_method: ScoringMethod::Traditional,
            top_scores: Vec::new(),
            auto_includes_count,
            excluded_count: 0,
        },
    }
}

fn build_result(
    selected: Vec<FileCandidate>,
    total_candidates: usize,
    token_usage: u32,
    token_budget: u32,
    scoring_method: ScoringMethod,
    auto_includes_count: usize,
) -> SelectionResult {
    let top_scores: Vec<TopScore> = selected
        .iter()
        .take(TOP_SCORES_LIMIT)
        .map(|c| TopScore {
            path: c.file.path.clone(),
            score: c.score,
            reasons: c.reasons.join(", "),
        })
        .collect();

    let selected_count = selected.len();
    SelectionResult {
        selected_files: selected
            .into_iter()
            .map(|c| SelectedFile::from(c.file))
            .collect(),
        debug: SelectionDebug {
            total_candidates,
            selected_count,
            token_usage,
            token_budget,
            scoring_method,
            top_scores,
            auto_includes_count,
            excluded_count: total_candidates - selected_count,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

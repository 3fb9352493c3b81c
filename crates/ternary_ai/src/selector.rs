//! Candidate preparation and budgeted selection.
//!
//! Auto-includes always make the cut and are never dropped for budget. The
//! rest compete under a mode-dependent file cap and a dynamic percentile
//! threshold, packed greedily into the token budget in rank order.

use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use ternary_core::{estimate_tokens, SmartContextMode};
use ternary_fs::{file_mtime_ms, CodebaseFile};

use crate::types::{ChatContext, FileCandidate};

/// Scores below this floor never pass the threshold, whatever the
/// percentile cut says.
const MIN_SCORE_FLOOR: f64 = 0.15;

/// Annotate raw scanner files into scoring candidates.
///
/// Each file gets a token estimate, the auto-include flag (scanner `force`
/// or membership in the chat's pinned paths), and one mtime stat used by
/// both recency scoring and the embedding cache.
pub fn prepare_candidates(
    files: Vec<CodebaseFile>,
    chat: &ChatContext,
    workspace_root: &Path,
) -> Vec<FileCandidate> {
    let auto_includes: HashSet<&str> = chat
        .smart_context_auto_includes
        .iter()
        .map(String::as_str)
        .collect();

    files
        .into_iter()
        .map(|file| {
            let tokens = estimate_tokens(&file.content) as u32;
            let is_auto_include = file.force || auto_includes.contains(file.path.as_str());
            let mtime_ms = file_mtime_ms(&workspace_root.join(&file.path));
            FileCandidate {
                file,
                score: 0.0,
                reasons: Vec::new(),
                is_auto_include,
                tokens,
                mtime_ms,
            }
        })
        .collect()
}

/// The dynamic minimum score for non-auto-include candidates: the
/// mode-dependent percentile of the observed scores, floored at
/// [`MIN_SCORE_FLOOR`].
fn dynamic_threshold(scored: &[FileCandidate], mode: SmartContextMode) -> f64 {
    if scored.is_empty() {
        return MIN_SCORE_FLOOR;
    }

    let mut scores: Vec<f64> = scored.iter().map(|c| c.score).collect();
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let idx = ((scores.len() as f64 * mode.score_percentile()).floor() as usize)
        .min(scores.len() - 1);
    scores[idx].max(MIN_SCORE_FLOOR)
}

/// Pick the final file set from ranked candidates.
///
/// Takes candidates already sorted by descending score (stable on input
/// order) and returns the selected candidates plus the total token usage.
/// Auto-includes are emitted first, in their ranked order, regardless of
/// score or budget; remaining candidates must clear the threshold, the
/// mode's file cap, and the budget. Packing stops at the first candidate
/// that would overflow the budget.
pub fn select_within_budget(
    candidates: Vec<FileCandidate>,
    token_budget: u32,
    mode: SmartContextMode,
) -> (Vec<FileCandidate>, u32) {
    let max_files = mode.max_files();

    let (auto_includes, rest): (Vec<FileCandidate>, Vec<FileCandidate>) = candidates
        .into_iter()
        .partition(|c| c.is_auto_include);

    let mut used_tokens: u32 = auto_includes.iter().map(|c| c.tokens).sum();
    let mut selected = auto_includes;

    let min_score = dynamic_threshold(&rest, mode);

    for mut candidate in rest {
        if candidate.score < min_score {
            debug!(
                "filtered: below threshold {:.3} < {:.3}: {}",
                candidate.score, min_score, candidate.file.path
            );
            candidate
                .reasons
                .push(format!("filtered: below threshold {min_score:.3}"));
            continue;
        }
        if selected.len() >= max_files {
            break;
        }
        if used_tokens.saturating_add(candidate.tokens) > token_budget {
            break;
        }
        used_tokens += candidate.tokens;
        selected.push(candidate);
    }

    (selected, used_tokens)
}

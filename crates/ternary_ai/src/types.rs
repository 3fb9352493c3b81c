//! Input and result types for smart context selection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use ternary_fs::CodebaseFile;

pub use ternary_core::SmartContextMode;

// ---------------------------------------------------------------------------
// Chat inputs
// ---------------------------------------------------------------------------

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single message from the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Per-chat workspace context: pinned files and upstream exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatContext {
    /// Workspace-relative paths the user pinned; always selected.
    pub smart_context_auto_includes: Vec<String>,
    /// Workspace-relative path prefixes excluded from scanning.
    pub exclude_paths: Vec<String>,
}

/// The prompt being answered plus recent conversation history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContext {
    pub user_prompt: String,
    pub recent_messages: Vec<ChatMessage>,
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A scanned file annotated with its selection state.
///
/// `score` only changes through additive contributions and `reasons` records
/// one entry per adjustment, so the final trail explains the final score.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub file: CodebaseFile,
    pub score: f64,
    pub reasons: Vec<String>,
    pub is_auto_include: bool,
    /// Estimated token cost of including this file.
    pub tokens: u32,
    /// Filesystem mtime in ms, when the stat succeeded.
    pub mtime_ms: Option<u64>,
}

impl FileCandidate {
    /// Lowercased final path component.
    pub fn basename(&self) -> String {
        self.file
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&self.file.path)
            .to_lowercase()
    }

    /// Lowercased path without the final component.
    pub fn parent_path(&self) -> String {
        match self.file.path.rsplit_once('/') {
            Some((parent, _)) => parent.to_lowercase(),
            None => String::new(),
        }
    }

    /// Lowercased file extension including the dot (e.g. `.tsx`).
    pub fn extension(&self) -> String {
        let base = self.basename();
        match base.rfind('.') {
            Some(idx) if idx > 0 => base[idx..].to_string(),
            _ => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Which base scorer produced this selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringMethod {
    #[serde(rename = "embeddings")]
    Embeddings,
    #[serde(rename = "tf-idf")]
    TfIdf,
    #[serde(rename = "traditional")]
    Traditional,
}

/// A file payload in the selection output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub path: String,
    pub content: String,
    pub force: bool,
}

impl From<CodebaseFile> for SelectedFile {
    fn from(file: CodebaseFile) -> Self {
        Self {
            path: file.path,
            content: file.content,
            force: file.force,
        }
    }
}

/// One entry of the debug score table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopScore {
    pub path: String,
    pub score: f64,
    /// Concatenated reason trail.
    pub reasons: String,
}

/// Observability trail for a selection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDebug {
    pub total_candidates: usize,
    pub selected_count: usize,
    pub token_usage: u32,
    pub token_budget: u32,
    pub scoring_method: ScoringMethod,
    /// The first ten selected files with final score and reasons.
    pub top_scores: Vec<TopScore>,
    pub auto_includes_count: usize,
    pub excluded_count: usize,
}

/// The outcome of a `select` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selected_files: Vec<SelectedFile>,
    pub debug: SelectionDebug,
}

/// Options for a single `select` call.
#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Workspace root to harvest candidates from.
    pub app_path: PathBuf,
    pub chat: ChatContext,
    pub prompt: PromptContext,
    pub mode: SmartContextMode,
    /// Model id used to derive the token budget when none is given.
    pub model: String,
    pub token_budget: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

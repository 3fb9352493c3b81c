use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

// ---------------------------------------------------------------------------
// Smart context mode
// ---------------------------------------------------------------------------

/// Selection mode for the smart context pipeline.
///
/// `Off` passes every scanned file through untouched. The other two modes
/// trade breadth for precision via the file cap and percentile threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmartContextMode {
    Off,
    Conservative,
    #[default]
    Balanced,
}

impl SmartContextMode {
    /// Maximum number of files a selection may contain in this mode.
    /// Auto-includes count toward the cap.
    pub fn max_files(self) -> usize {
        match self {
            SmartContextMode::Conservative => 8,
            _ => 20,
        }
    }

    /// Percentile used for the dynamic score threshold.
    pub fn score_percentile(self) -> f64 {
        match self {
            SmartContextMode::Conservative => 0.85,
            _ => 0.70,
        }
    }
}

// ---------------------------------------------------------------------------
// TernaryConfig
// ---------------------------------------------------------------------------

/// Name of the directory holding all Ternary state (`~/.ternary`, and the
/// per-workspace `.ternary` cache root).
pub const TERNARY_DIR: &str = ".ternary";

/// Subdirectory of the workspace `.ternary` dir holding embedding cache files.
pub const EMBEDDINGS_CACHE_DIR: &str = "embeddings-cache";

/// Application configuration stored at `~/.ternary/config.json`.
///
/// Unknown fields are ignored and missing fields take defaults, so configs
/// written by older or newer builds load cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TernaryConfig {
    /// Smart context selection mode.
    pub smart_context_mode: SmartContextMode,

    /// Explicit token budget for context selection. When absent the budget
    /// is derived from the active model's context window.
    pub smart_context_token_budget: Option<u32>,

    /// Maximum age of embedding cache entries, in days.
    pub embeddings_cache_max_age_days: u64,

    /// Base URL of the local Ollama server used for embeddings.
    pub ollama_base_url: Option<String>,

    /// Embedding model name requested from the embedding provider.
    pub embedding_model: String,

    /// Default chat model, used for context-window lookup.
    pub default_model: String,
}

impl Default for TernaryConfig {
    fn default() -> Self {
        Self {
            smart_context_mode: SmartContextMode::Balanced,
            smart_context_token_budget: None,
            embeddings_cache_max_age_days: 7,
            ollama_base_url: None,
            embedding_model: "nomic-embed-text".into(),
            default_model: "claude-sonnet-4".into(),
        }
    }
}

impl TernaryConfig {
    /// Base directory for Ternary state: `~/.ternary`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(TERNARY_DIR))
    }

    /// Directory for log files: `~/.ternary/logs`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Path to the config file: `~/.ternary/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Embedding cache directory rooted at a workspace:
    /// `<workspace>/.ternary/embeddings-cache`
    pub fn embeddings_cache_dir(workspace_root: &Path) -> PathBuf {
        workspace_root.join(TERNARY_DIR).join(EMBEDDINGS_CACHE_DIR)
    }

    /// Load the config from `~/.ternary/config.json`, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!("Could not resolve config path: {e}");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path, defaulting on any failure.
    /// A corrupt file is logged and replaced by defaults rather than
    /// aborting startup.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Invalid config at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the config to `~/.ternary/config.json`.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Persist the config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Maximum embedding cache entry age as a `Duration`.
    pub fn embeddings_cache_max_age(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.embeddings_cache_max_age_days * 24 * 60 * 60)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

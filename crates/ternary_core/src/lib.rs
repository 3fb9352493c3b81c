//! Core data types and services for the Ternary backend.
//!
//! This crate provides the foundational configuration management, error
//! taxonomy, logging setup, and token accounting used across the other
//! Ternary crates.

/// Application configuration with JSON persistence under `~/.ternary`.
pub mod config;
/// Token estimation and model context-window sizes.
pub mod context;
/// Error classification for logging and user display.
pub mod error;
/// Logging initialization with daily file rotation and console output.
pub mod logging;

pub use config::{SmartContextMode, TernaryConfig};
pub use context::{estimate_tokens, model_context_size};
pub use error::{ErrorCategory, TernaryError};

//! Error types for ollama-journal
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for ollama-journal operations
///
/// Covers configuration loading, the SQLite store, the markdown mirror,
/// and the inference server exchange.
#[derive(Error, Debug)]
pub enum JournalError {
    /// Configuration-related errors (missing file, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Inference server errors (connection, status, response body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Markdown transcript errors
    #[error("Mirror error: {0}")]
    Mirror(String),

    /// Line editor errors
    #[error("Input error: {0}")]
    Readline(String),
}

/// Result type alias for ollama-journal operations
///
/// Uses `anyhow::Error` so call sites can attach context while the
/// typed [`JournalError`] stays recoverable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

//! Provider module for ollama-journal
//!
//! This module contains the inference backend abstraction and the Ollama
//! implementation.

pub mod base;
pub mod ollama;
pub mod stream;

pub use base::{ChunkSink, Message, Provider, Role, FAILED_REPLY_SENTINEL};
pub use ollama::OllamaProvider;

use crate::config::OllamaConfig;
use crate::error::Result;

/// Create the provider described by the configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
pub fn create_provider(config: &OllamaConfig) -> Result<Box<dyn Provider>> {
    Ok(Box::new(OllamaProvider::new(config.clone())?))
}

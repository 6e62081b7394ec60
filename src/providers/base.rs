//! Base provider trait and common types
//!
//! This module defines the `Provider` trait that inference backends
//! implement, along with the message types exchanged with them.

use crate::error::{JournalError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reply text persisted in place of an answer when the server cannot be
/// reached or returns an error
pub const FAILED_REPLY_SENTINEL: &str = "Error: failed to fetch response.";

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person at the terminal
    User,
    /// The model's reply
    Assistant,
}

impl Role {
    /// Lowercase wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized label used in transcript headings
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = JournalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(JournalError::Storage(format!("Unknown message role: {}", other))),
        }
    }
}

/// One role/content pair of a conversation history
///
/// This is exactly what is sent upstream: the model that produced an
/// assistant turn is recorded in the store but never sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::providers::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Receiver for reply fragments as they arrive
pub type ChunkSink<'a> = dyn for<'c> FnMut(&'c str) + Send + 'a;

/// Chat-completion backend
///
/// Implementations issue one request carrying the full history and return
/// the reply text. Failures are returned as errors; turning a failure into
/// persisted reply text is the caller's decision.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the full ordered history and return the reply
    ///
    /// # Arguments
    ///
    /// * `model` - Model identifier for this request
    /// * `messages` - Conversation history, oldest first
    /// * `stream` - Ask the server for incremental fragments
    /// * `on_chunk` - Called with each fragment in arrival order; called once
    ///   with the whole reply when not streaming
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Provider` on connection failure, non-success
    /// status, or an error payload from the server.
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        stream: bool,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<String>;
}

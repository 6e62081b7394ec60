//! Ollama provider implementation
//!
//! This module implements the Provider trait for Ollama's `/api/chat`
//! endpoint, in both single-response and streamed (NDJSON) modes.

use crate::config::OllamaConfig;
use crate::error::{JournalError, Result};
use crate::providers::stream::NdjsonReader;
use crate::providers::{ChunkSink, Message, Provider};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API provider
///
/// # Examples
///
/// ```no_run
/// use ollama_journal::config::OllamaConfig;
/// use ollama_journal::providers::{Message, OllamaProvider, Provider};
///
/// # async fn example() -> ollama_journal::error::Result<()> {
/// let provider = OllamaProvider::new(OllamaConfig::default())?;
/// let history = vec![Message::user("Hello!")];
/// let reply = provider
///     .chat("llama3.2:latest", &history, true, &mut |chunk: &str| print!("{}", chunk))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct OllamaProvider {
    client: Client,
    host: String,
}

/// Request structure for Ollama's chat endpoint
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Message body in a chat response or stream fragment
#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Response object, or one line of a streamed response
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

impl OllamaChatResponse {
    fn into_content(self) -> Result<String> {
        if let Some(error) = self.error {
            tracing::error!("Ollama returned an error payload: {}", error);
            return Err(JournalError::Provider(format!("Ollama error: {}", error)).into());
        }
        Ok(self.message.map(|m| m.content).unwrap_or_default())
    }
}

/// Accumulates a streamed reply fragment by fragment
///
/// Fragments are forwarded to `on_chunk` in arrival order before being
/// appended, so terminal echo never lags behind the stored text.
#[derive(Debug, Default)]
pub(crate) struct ChatStreamAccumulator {
    reader: NdjsonReader,
    reply: String,
    done: bool,
}

impl ChatStreamAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether a fragment marked `done` has been seen
    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one network read
    pub(crate) fn push(
        &mut self,
        bytes: &[u8],
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<()> {
        let fragments: Vec<OllamaChatResponse> = self.reader.push(bytes);
        for fragment in fragments {
            self.apply(fragment, on_chunk)?;
            if self.done {
                break;
            }
        }
        Ok(())
    }

    /// Flush any trailing fragment and return the accumulated reply
    pub(crate) fn finish(mut self, on_chunk: &mut ChunkSink<'_>) -> Result<String> {
        if !self.done {
            if let Some(fragment) = self.reader.finish::<OllamaChatResponse>() {
                self.apply(fragment, on_chunk)?;
            }
        }

        if self.reader.skipped() > 0 {
            tracing::warn!(
                "Skipped {} malformed fragment(s) while streaming reply",
                self.reader.skipped()
            );
        }

        Ok(self.reply.trim().to_string())
    }

    fn apply(
        &mut self,
        fragment: OllamaChatResponse,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<()> {
        if fragment.done {
            self.done = true;
            tracing::debug!(
                "Ollama stream done: prompt_tokens={}, completion_tokens={}",
                fragment.prompt_eval_count,
                fragment.eval_count
            );
        }

        let chunk = fragment.into_content()?;
        if !chunk.is_empty() {
            on_chunk(&chunk);
            self.reply.push_str(&chunk);
        }
        Ok(())
    }
}

impl OllamaProvider {
    /// Create a new Ollama provider instance
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::config::OllamaConfig;
    /// use ollama_journal::providers::OllamaProvider;
    ///
    /// let provider = OllamaProvider::new(OllamaConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ollama-journal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JournalError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Ollama provider: host={}", config.host);

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
        })
    }

    /// Get the configured Ollama host
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::config::OllamaConfig;
    /// use ollama_journal::providers::OllamaProvider;
    ///
    /// let config = OllamaConfig {
    ///     host: "http://localhost:11434/".to_string(),
    ///     ..Default::default()
    /// };
    /// let provider = OllamaProvider::new(config).unwrap();
    /// assert_eq!(provider.host(), "http://localhost:11434");
    /// ```
    pub fn host(&self) -> &str {
        &self.host
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        stream: bool,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<String> {
        let url = self.chat_url();
        let request = OllamaChatRequest {
            model,
            messages,
            stream,
        };

        tracing::debug!(
            "Sending Ollama request: model={}, {} messages, stream={}",
            model,
            messages.len(),
            stream
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                JournalError::Provider(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(JournalError::Provider(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        if !stream {
            let body: OllamaChatResponse = response.json().await.map_err(|e| {
                tracing::error!("Failed to parse Ollama response: {}", e);
                JournalError::Provider(format!("Failed to parse Ollama response: {}", e))
            })?;
            tracing::debug!(
                "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
                body.done,
                body.prompt_eval_count,
                body.eval_count
            );
            let reply = body.into_content()?.trim().to_string();
            on_chunk(&reply);
            return Ok(reply);
        }

        let mut accumulator = ChatStreamAccumulator::new();
        let byte_stream = response.bytes_stream();
        tokio::pin!(byte_stream);
        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|e| {
                tracing::error!("Ollama stream interrupted: {}", e);
                JournalError::Provider(format!("Ollama stream interrupted: {}", e))
            })?;
            accumulator.push(&bytes, on_chunk)?;
            if accumulator.is_done() {
                break;
            }
        }

        accumulator.finish(on_chunk)
    }
}

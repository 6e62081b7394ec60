//! Newline-delimited JSON stream reader
//!
//! Streamed chat replies arrive as one JSON object per line, but network
//! reads do not respect line boundaries: a read may carry several objects,
//! or end halfway through one (or halfway through a UTF-8 sequence). The
//! reader buffers raw bytes and only decodes complete lines.

use serde::de::DeserializeOwned;

/// Incremental NDJSON decoder
///
/// Malformed lines are skipped with a warning and counted; they never stop
/// the stream.
///
/// # Examples
///
/// ```
/// use ollama_journal::providers::stream::NdjsonReader;
/// use serde_json::Value;
///
/// let mut reader = NdjsonReader::new();
/// let first: Vec<Value> = reader.push(b"{\"a\":1}\n{\"b\"");
/// assert_eq!(first.len(), 1);
/// let second: Vec<Value> = reader.push(b":2}\n");
/// assert_eq!(second.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct NdjsonReader {
    buffer: Vec<u8>,
    skipped: usize,
}

impl NdjsonReader {
    /// Create an empty reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every complete line that decoded
    pub fn push<T: DeserializeOwned>(&mut self, bytes: &[u8]) -> Vec<T> {
        self.buffer.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(value) = self.decode_line(&line[..line.len() - 1]) {
                decoded.push(value);
            }
        }
        decoded
    }

    /// Decode whatever remains after the stream ends without a final newline
    pub fn finish<T: DeserializeOwned>(&mut self) -> Option<T> {
        let rest = std::mem::take(&mut self.buffer);
        self.decode_line(&rest)
    }

    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line<T: DeserializeOwned>(&mut self, line: &[u8]) -> Option<T> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!("Skipping stream fragment with invalid UTF-8: {}", e);
                return None;
            }
        };

        if text.is_empty() {
            return None;
        }

        match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!("Skipping malformed stream fragment: {} ({})", text, e);
                None
            }
        }
    }
}

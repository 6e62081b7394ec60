//! Markdown transcripts kept alongside the store
//!
//! Each session is mirrored to `<chats_dir>/<folder>/<filename>.md`: a
//! title/start header followed by one block per turn. The mirror is a
//! best-effort projection: nothing links a file back to its session row,
//! and the two may drift apart.

use crate::error::{JournalError, Result};
use crate::providers::Role;
use crate::storage::{StoredMessage, StoredSession};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Writes chat transcripts under a root directory
#[derive(Debug, Clone)]
pub struct MarkdownMirror {
    chats_dir: PathBuf,
}

impl MarkdownMirror {
    /// Create a mirror rooted at `chats_dir`
    pub fn new<P: Into<PathBuf>>(chats_dir: P) -> Self {
        Self {
            chats_dir: chats_dir.into(),
        }
    }

    /// Root directory of all transcripts
    pub fn chats_dir(&self) -> &Path {
        &self.chats_dir
    }

    /// Transcript location for a session
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::mirror::MarkdownMirror;
    /// use std::path::Path;
    ///
    /// let mirror = MarkdownMirror::new("chats");
    /// assert_eq!(
    ///     mirror.resolve_path("work", "standup"),
    ///     Path::new("chats/work/standup.md")
    /// );
    /// ```
    pub fn resolve_path(&self, folder: &str, filename: &str) -> PathBuf {
        self.chats_dir
            .join(folder)
            .join(format!("{}.md", filename))
    }

    /// Create the session folder (and parents) if absent
    pub fn ensure_folder(&self, folder: &str) -> Result<()> {
        let path = self.chats_dir.join(folder);
        fs::create_dir_all(&path).map_err(|e| {
            JournalError::Mirror(format!("Failed to create {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// Create or truncate a transcript and write its header
    pub fn initialize_transcript(
        &self,
        folder: &str,
        filename: &str,
        started_at: &str,
    ) -> Result<PathBuf> {
        self.ensure_folder(folder)?;
        let path = self.resolve_path(folder, filename);
        fs::write(&path, format_header(filename, started_at)).map_err(|e| {
            JournalError::Mirror(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }

    /// Append one turn to a transcript
    ///
    /// The file is opened in append mode; earlier content is never rewritten.
    pub fn append_turn(
        &self,
        folder: &str,
        filename: &str,
        role: Role,
        content: &str,
        timestamp: &str,
        model: Option<&str>,
    ) -> Result<()> {
        let path = self.resolve_path(folder, filename);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                JournalError::Mirror(format!("Failed to open {}: {}", path.display(), e))
            })?;

        file.write_all(format_turn(role, content, timestamp, model).as_bytes())
            .map_err(|e| {
                JournalError::Mirror(format!("Failed to append to {}: {}", path.display(), e))
            })?;
        Ok(())
    }

    /// Remove a transcript, then its folder if nothing else is left in it
    ///
    /// Returns whether a file was removed.
    pub fn delete_transcript(&self, folder: &str, filename: &str) -> Result<bool> {
        let path = self.resolve_path(folder, filename);
        let removed = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                return Err(JournalError::Mirror(format!(
                    "Failed to remove {}: {}",
                    path.display(),
                    e
                ))
                .into())
            }
        };

        let dir = self.chats_dir.join(folder);
        // Never prune the chats root itself (empty folder name).
        if dir != self.chats_dir && is_empty_dir(&dir) {
            fs::remove_dir(&dir).map_err(|e| {
                JournalError::Mirror(format!("Failed to remove {}: {}", dir.display(), e))
            })?;
            tracing::debug!("Removed empty folder {}", dir.display());
        }

        Ok(removed)
    }

    /// Rewrite a whole transcript from stored records
    pub fn export_session(
        &self,
        session: &StoredSession,
        messages: &[StoredMessage],
    ) -> Result<PathBuf> {
        self.ensure_folder(&session.folder)?;
        let path = self.resolve_path(&session.folder, &session.filename);

        let mut body = format_header(&session.filename, &session.created_at);
        for message in messages {
            body.push_str(&format_turn(
                message.role,
                &message.content,
                &message.timestamp,
                message.model.as_deref(),
            ));
        }

        fs::write(&path, body).map_err(|e| {
            JournalError::Mirror(format!("Failed to write {}: {}", path.display(), e))
        })?;
        Ok(path)
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Transcript header
pub fn format_header(filename: &str, started_at: &str) -> String {
    format!("# Chat: {}\n\n> Started: {}\n\n---\n\n", filename, started_at)
}

/// One transcript block: heading line, then the trimmed body in a fence
///
/// The fence is one backtick longer than the longest backtick run in the
/// body, and never shorter than three.
pub fn format_turn(role: Role, content: &str, timestamp: &str, model: Option<&str>) -> String {
    let mut heading = format!("### {} — {}", role.label(), timestamp);
    if role == Role::Assistant {
        if let Some(model) = model {
            heading.push_str(" — ");
            heading.push_str(model);
        }
    }

    let body = content.trim();
    let fence = "`".repeat(longest_backtick_run(body).max(2) + 1);
    format!("{}\n{}\n{}\n{}\n\n", heading, fence, body, fence)
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

//! Live chat session orchestration
//!
//! A [`ChatSession`] ties one stored session to its markdown transcript and
//! the inference provider. Every user turn is persisted before the request
//! goes out, and the request always carries the full history as re-read
//! from the store, so the store is the single source of truth for context.

use crate::commands::special_commands::{parse_special_command, CommandError, SpecialCommand};
use crate::error::{JournalError, Result};
use crate::mirror::MarkdownMirror;
use crate::providers::{ChunkSink, Provider, Role, FAILED_REPLY_SENTINEL};
use crate::storage::{SqliteStorage, StoredMessage, StoredSession};
use std::path::PathBuf;

/// What a line of user input turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing was stored or sent
    Ignored,
    /// The user asked to leave the chat
    Exit,
    /// The model for later turns changed
    ModelSwitched { from: String, to: String },
    /// The user asked for the command list
    Help,
    /// The user asked for the session status
    Status,
    /// A command with a missing argument
    Invalid(CommandError),
    /// A turn was exchanged with the model
    Replied(TurnReply),
}

/// Result of one user/assistant exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Reply text as stored; the failure sentinel when `failed` is set
    pub content: String,
    /// Model recorded on the assistant turn
    pub model: String,
    /// The request failed and the sentinel was stored instead of a reply
    pub failed: bool,
}

/// One open chat bound to a stored session
pub struct ChatSession<'a> {
    storage: &'a SqliteStorage,
    mirror: &'a MarkdownMirror,
    provider: &'a dyn Provider,
    session: StoredSession,
    model: String,
    stream: bool,
}

impl<'a> ChatSession<'a> {
    /// Create a new session row and a fresh transcript
    ///
    /// An existing transcript at the same path is truncated.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be stored. Transcript failures are
    /// logged and do not abort the chat.
    pub fn start(
        storage: &'a SqliteStorage,
        mirror: &'a MarkdownMirror,
        provider: &'a dyn Provider,
        folder: &str,
        filename: &str,
        model: &str,
        stream: bool,
    ) -> Result<Self> {
        let id = storage.create_session(folder, filename)?;
        let session = storage.get_session(id)?.ok_or_else(|| {
            JournalError::Storage(format!("Session {} vanished after insert", id))
        })?;

        if let Err(e) = mirror.initialize_transcript(folder, filename, &session.created_at) {
            tracing::warn!("Transcript not initialized: {}", e);
        }

        tracing::info!(
            "Started session {} ({}) with model {}",
            session.id,
            session.display_path(),
            model
        );

        Ok(Self {
            storage,
            mirror,
            provider,
            session,
            model: model.to_string(),
            stream,
        })
    }

    /// Reopen a stored session
    ///
    /// Returns `Ok(None)` when no session has this id. If the transcript is
    /// missing it is rebuilt from the stored messages; an existing one is
    /// appended to as is.
    pub fn resume(
        storage: &'a SqliteStorage,
        mirror: &'a MarkdownMirror,
        provider: &'a dyn Provider,
        session_id: i64,
        model: &str,
        stream: bool,
    ) -> Result<Option<Self>> {
        let session = match storage.get_session(session_id)? {
            Some(session) => session,
            None => return Ok(None),
        };

        let path = mirror.resolve_path(&session.folder, &session.filename);
        if !path.exists() {
            let messages = storage.get_messages(session.id)?;
            match mirror.export_session(&session, &messages) {
                Ok(path) => tracing::info!("Rebuilt missing transcript {}", path.display()),
                Err(e) => tracing::warn!("Transcript not rebuilt: {}", e),
            }
        }

        tracing::info!(
            "Resumed session {} ({}) with model {}",
            session.id,
            session.display_path(),
            model
        );

        Ok(Some(Self {
            storage,
            mirror,
            provider,
            session,
            model: model.to_string(),
            stream,
        }))
    }

    /// Stored session this chat writes to
    pub fn session(&self) -> &StoredSession {
        &self.session
    }

    /// Model used for the next turn
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether replies are requested as a stream
    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    /// Location of this chat's transcript
    pub fn transcript_path(&self) -> PathBuf {
        self.mirror
            .resolve_path(&self.session.folder, &self.session.filename)
    }

    /// Number of turns stored so far
    pub fn message_count(&self) -> Result<usize> {
        self.storage.message_count(self.session.id)
    }

    /// Use `model` for subsequent turns; returns the previous model
    ///
    /// Earlier assistant turns keep the model they were produced by.
    pub fn switch_model(&mut self, model: &str) -> String {
        tracing::info!("Switching model from {} to {}", self.model, model);
        std::mem::replace(&mut self.model, model.to_string())
    }

    /// Interpret one line of user input
    ///
    /// Special commands act on the session; anything else non-blank is sent
    /// as a turn via [`ChatSession::send_turn`].
    pub async fn handle_input(
        &mut self,
        line: &str,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<TurnOutcome> {
        if line.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        match parse_special_command(line) {
            Ok(SpecialCommand::Exit) => Ok(TurnOutcome::Exit),
            Ok(SpecialCommand::SwitchModel(model)) => {
                let from = self.switch_model(&model);
                Ok(TurnOutcome::ModelSwitched { from, to: model })
            }
            Ok(SpecialCommand::Help) => Ok(TurnOutcome::Help),
            Ok(SpecialCommand::ShowStatus) => Ok(TurnOutcome::Status),
            Ok(SpecialCommand::None) => Ok(TurnOutcome::Replied(
                self.send_turn(line, on_chunk).await?,
            )),
            Err(e) => Ok(TurnOutcome::Invalid(e)),
        }
    }

    /// Exchange one turn with the model
    ///
    /// The user text is stored verbatim, then the whole stored history is
    /// sent. A failed request stores [`FAILED_REPLY_SENTINEL`] as the reply,
    /// so the next turn still goes out.
    ///
    /// # Errors
    ///
    /// Returns error only when the store cannot be read or written.
    pub async fn send_turn(
        &mut self,
        text: &str,
        on_chunk: &mut ChunkSink<'_>,
    ) -> Result<TurnReply> {
        let user = self
            .storage
            .save_message(self.session.id, Role::User, text, None)?;
        self.mirror_turn(&user);

        let history = self.storage.get_history(self.session.id)?;
        tracing::debug!(
            "Sending {} message(s) to {} (stream: {})",
            history.len(),
            self.model,
            self.stream
        );

        let (content, failed) = match self
            .provider
            .chat(&self.model, &history, self.stream, on_chunk)
            .await
        {
            Ok(reply) => (reply, false),
            Err(e) => {
                tracing::warn!("Request to {} failed: {:#}", self.model, e);
                (FAILED_REPLY_SENTINEL.to_string(), true)
            }
        };

        let assistant = self.storage.save_message(
            self.session.id,
            Role::Assistant,
            &content,
            Some(&self.model),
        )?;
        self.mirror_turn(&assistant);

        Ok(TurnReply {
            content,
            model: self.model.clone(),
            failed,
        })
    }

    fn mirror_turn(&self, message: &StoredMessage) {
        if let Err(e) = self.mirror.append_turn(
            &self.session.folder,
            &self.session.filename,
            message.role,
            &message.content,
            &message.timestamp,
            message.model.as_deref(),
        ) {
            tracing::warn!("Transcript not updated: {}", e);
        }
    }
}

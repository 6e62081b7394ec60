/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`    — Interactive chat loop (new or continued session)
- `history` — Listing and deleting stored sessions
- `export`  — Rewriting markdown transcripts from the database
- `menu`    — The numbered menu shown when no subcommand is given

Handlers share one [`AppContext`] built from the loaded configuration.
*/

use crate::config::Config;
use crate::error::{JournalError, Result};
use crate::mirror::MarkdownMirror;
use crate::providers::{create_provider, Provider};
use crate::storage::SqliteStorage;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod export;
pub mod history;
pub mod menu;

// Special commands parser for in-chat commands
pub mod special_commands;

/// Everything a command handler needs, built once at startup
pub struct AppContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Session and message store
    pub storage: SqliteStorage,
    /// Markdown transcript writer
    pub mirror: MarkdownMirror,
    /// Inference backend
    pub provider: Box<dyn Provider>,
}

impl AppContext {
    /// Open the store, the mirror root, and the Ollama client from `config`
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or the HTTP client
    /// cannot be built
    pub fn new(config: Config) -> Result<Self> {
        let provider = create_provider(&config.ollama)?;
        Self::with_provider(config, provider)
    }

    /// Same as [`AppContext::new`] with a caller-supplied provider
    pub fn with_provider(config: Config, provider: Box<dyn Provider>) -> Result<Self> {
        let clock = config.clock()?;
        let storage = SqliteStorage::from_config(&config.paths, clock)?;
        let mirror = MarkdownMirror::new(&config.paths.chats_dir);

        tracing::debug!(
            "Using database {} and chats directory {}",
            storage.db_path().display(),
            mirror.chats_dir().display()
        );

        Ok(Self {
            config,
            storage,
            mirror,
            provider,
        })
    }
}

/// Read one line; `None` when the user pressed Ctrl-C or Ctrl-D
pub fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(JournalError::Readline(e.to_string()).into()),
    }
}

/// Ask a `[y/N]` question; anything but `y`/`yes` declines
pub fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    let answer = read_line(rl, &format!("{} [y/N]: ", question))?;
    Ok(answer.as_deref().map(is_yes).unwrap_or(false))
}

/// Whether an answer to a `[y/N]` question accepts
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Opens a [`ChatSession`] and runs a readline loop that hands every line
    //! to it, echoing reply fragments to stdout as they arrive.

    use super::*;
    use crate::commands::special_commands::print_help;
    use crate::session::{ChatSession, TurnOutcome};
    use colored::Colorize;
    use std::io::Write;

    /// Start a new chat session
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared application context
    /// * `rl` - Line editor, shared with the menu so history carries over
    /// * `folder` - Folder under the chats directory
    /// * `filename` - Transcript name without `.md`
    /// * `model` - Optional override for the configured model
    pub async fn run_chat(
        ctx: &AppContext,
        rl: &mut DefaultEditor,
        folder: &str,
        filename: &str,
        model: Option<&str>,
    ) -> Result<()> {
        let existing = ctx.storage.find_sessions_by_path(folder, filename)?;
        if !existing.is_empty() {
            let ids: Vec<String> = existing.iter().map(|s| s.id.to_string()).collect();
            println!(
                "{}",
                format!(
                    "Warning: {}/{} is already used by session(s) {}; its transcript will be overwritten.",
                    folder,
                    filename,
                    ids.join(", ")
                )
                .yellow()
            );
        }

        let model = model.unwrap_or(&ctx.config.ollama.model);
        let mut chat = ChatSession::start(
            &ctx.storage,
            &ctx.mirror,
            ctx.provider.as_ref(),
            folder,
            filename,
            model,
            ctx.config.ollama.stream,
        )?;

        println!(
            "\nStarting new chat in {}",
            format!("{}.md", chat.session().display_path()).cyan()
        );
        print_welcome(&chat);
        chat_loop(&mut chat, rl).await
    }

    /// Continue a stored session
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Storage` if no session has this id
    pub async fn continue_chat(
        ctx: &AppContext,
        rl: &mut DefaultEditor,
        session_id: i64,
        model: Option<&str>,
    ) -> Result<()> {
        let model = model.unwrap_or(&ctx.config.ollama.model);
        let mut chat = ChatSession::resume(
            &ctx.storage,
            &ctx.mirror,
            ctx.provider.as_ref(),
            session_id,
            model,
            ctx.config.ollama.stream,
        )?
        .ok_or_else(|| JournalError::Storage(format!("Session {} not found", session_id)))?;

        println!(
            "\nContinuing chat {} ({} messages so far)",
            chat.session().display_path().cyan(),
            chat.message_count()?
        );
        print_welcome(&chat);
        chat_loop(&mut chat, rl).await
    }

    async fn chat_loop(chat: &mut ChatSession<'_>, rl: &mut DefaultEditor) -> Result<()> {
        loop {
            let line = match read_line(rl, "You: ")? {
                Some(line) => line,
                None => break,
            };

            let model = chat.model().to_string();
            let mut label_shown = false;
            let outcome = {
                let mut echo = |chunk: &str| {
                    if !label_shown {
                        println!("\n{}", format!("{}:", model).cyan().bold());
                        label_shown = true;
                    }
                    print!("{}", chunk);
                    let _ = std::io::stdout().flush();
                };
                chat.handle_input(&line, &mut echo).await?
            };

            match outcome {
                TurnOutcome::Ignored => {}
                TurnOutcome::Exit => break,
                TurnOutcome::ModelSwitched { from, to } => {
                    println!("{}\n", format!("Switched model from {} to {}", from, to).green());
                }
                TurnOutcome::Help => print_help(),
                TurnOutcome::Status => print_status(chat)?,
                TurnOutcome::Invalid(e) => eprintln!("{}\n", e.to_string().red()),
                TurnOutcome::Replied(reply) => {
                    if reply.failed {
                        if label_shown {
                            println!();
                        }
                        eprintln!("{}", reply.content.red());
                    }
                    println!("\n");
                }
            }
        }

        println!("Chat ended.");
        Ok(())
    }

    fn print_welcome(chat: &ChatSession<'_>) {
        println!("Using model: {}", chat.model().cyan());
        println!("Type '/switch <model>' to change model, '/help' for commands, 'exit' to stop.\n");
    }

    fn print_status(chat: &ChatSession<'_>) -> Result<()> {
        let session = chat.session();
        println!("\n{}", "Session Status".bold());
        println!("  ID:         {}", session.id);
        println!("  Path:       {}", session.display_path());
        println!("  Transcript: {}", chat.transcript_path().display());
        println!("  Started:    {}", session.created_at);
        println!("  Model:      {}", chat.model().cyan());
        println!(
            "  Streaming:  {}",
            if chat.is_streaming() { "on" } else { "off" }
        );
        println!("  Messages:   {}\n", chat.message_count()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes_accepts_only_yes() {
        for answer in ["y", "Y", "yes", " YES "] {
            assert!(is_yes(answer), "answer: {}", answer);
        }
        for answer in ["", "n", "no", "yep", "1"] {
            assert!(!is_yes(answer), "answer: {}", answer);
        }
    }
}

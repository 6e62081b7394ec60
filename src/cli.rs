//! Command-line interface definition for ollama-journal
//!
//! This module defines the CLI structure using clap's derive API. Running
//! the binary without a subcommand opens the interactive numbered menu;
//! each menu entry is also reachable directly as a subcommand.

use clap::{Parser, Subcommand};

/// ollama-journal - chat with a local Ollama server and keep every session
///
/// Conversations are stored in SQLite and mirrored to markdown files
/// under `<chats_dir>/<folder>/<filename>.md`.
#[derive(Parser, Debug, Clone)]
#[command(name = "ollama-journal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Wait for complete replies instead of streaming them
    #[arg(long)]
    pub no_stream: bool,

    /// Command to execute (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the interactive menu
    Menu,

    /// Start a new chat session
    Chat {
        /// Folder under the chats directory
        #[arg(short, long, default_value = "default")]
        folder: String,

        /// Transcript file name (without `.md`)
        #[arg(short, long, default_value = "chat-1")]
        name: String,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List stored chat sessions
    List,

    /// Continue an existing chat session
    Continue {
        /// Session ID as shown by `list`
        id: i64,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Rewrite markdown transcripts from the database
    Export {
        /// Export a single session instead of all of them
        #[arg(long)]
        id: Option<i64>,
    },

    /// Delete a chat session and its transcript
    Delete {
        /// Session ID as shown by `list`
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            no_stream: false,
            command: None,
        }
    }
}

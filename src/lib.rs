//! ollama-journal - chat with a local Ollama server and keep every session
//!
//! This library provides the pieces behind the `ollama-journal` binary:
//! a SQLite session store, a markdown transcript mirror, an Ollama chat
//! client with NDJSON streaming, and the session orchestrator that ties
//! them together.
//!
//! # Architecture
//!
//! - `storage`: Sessions and messages in SQLite
//! - `mirror`: Markdown transcripts under `<chats_dir>/<folder>/<filename>.md`
//! - `providers`: Inference backend abstraction and the Ollama client
//! - `session`: One live chat; persists every turn and calls the provider
//! - `commands`: Interactive menu and subcommand handlers
//! - `config`: Configuration loading and validation
//! - `clock`: Timestamps in the configured fixed offset
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use ollama_journal::{AppContext, Cli, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let ctx = AppContext::new(config)?;
//!     for session in ctx.storage.list_sessions()? {
//!         println!("{} {}", session.id, session.display_path());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod mirror;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use cli::Cli;
pub use clock::Clock;
pub use commands::AppContext;
pub use config::Config;
pub use error::{JournalError, Result};
pub use mirror::MarkdownMirror;
pub use providers::{Message, OllamaProvider, Provider, Role, FAILED_REPLY_SENTINEL};
pub use session::{ChatSession, TurnOutcome, TurnReply};
pub use storage::{SqliteStorage, StoredMessage, StoredSession};

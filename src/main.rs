//! ollama-journal - chat with a local Ollama server and keep every session
//!
//! Main entry point: parses arguments, loads configuration, and dispatches
//! to the menu or a subcommand.

use anyhow::Result;
use rustyline::DefaultEditor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ollama_journal::cli::{Cli, Commands};
use ollama_journal::commands::{self, history, AppContext};
use ollama_journal::config::Config;
use ollama_journal::error::JournalError;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration; missing or invalid configuration is fatal
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    let ctx = AppContext::new(config)?;
    let mut rl = DefaultEditor::new().map_err(|e| JournalError::Readline(e.to_string()))?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            tracing::info!("Starting interactive menu");
            commands::menu::run_menu(&ctx, &mut rl).await
        }
        Commands::Chat {
            folder,
            name,
            model,
        } => {
            tracing::info!("Starting new chat in {}/{}", folder, name);
            commands::chat::run_chat(&ctx, &mut rl, &folder, &name, model.as_deref()).await
        }
        Commands::List => history::list_chats(&ctx),
        Commands::Continue { id, model } => {
            tracing::info!("Continuing session {}", id);
            commands::chat::continue_chat(&ctx, &mut rl, id, model.as_deref()).await
        }
        Commands::Export { id } => commands::export::run_export(&ctx, id),
        Commands::Delete { id, yes } => {
            if !yes && !commands::confirm(&mut rl, &format!("Delete chat {} and its transcript?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = history::delete_chat(&ctx, id)?;
            history::report_delete(id, &outcome);
            match outcome {
                history::DeleteOutcome::NotFound => {
                    Err(JournalError::Storage(format!("Session {} not found", id)).into())
                }
                history::DeleteOutcome::Deleted { .. } => Ok(()),
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ollama_journal=debug"
    } else {
        "ollama_journal=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

//! Special commands parser for interactive chat
//!
//! Special commands change session state or show information instead of
//! being sent to the model:
//! - `/switch <model>` changes the model for subsequent turns
//! - `/status` shows the session and current model
//! - `/help` lists the commands
//! - `exit`, `quit`, `/exit`, `/quit` end the chat
//!
//! Command names are case-insensitive; arguments keep their case. Any other
//! input, including text that merely starts with `/`, is a chat turn.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Use a different model for the following turns
    SwitchModel(String),

    /// Display the session path, id, and current model
    ShowStatus,

    /// Display help information
    Help,

    /// End the chat and return to the menu
    Exit,

    /// Not a special command; the input is a chat turn
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::MissingArgument` for `/switch` without a model name.
///
/// # Examples
///
/// ```
/// use ollama_journal::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/switch Mistral:7B").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchModel("Mistral:7B".to_string()));
///
/// let cmd = parse_special_command("hello model").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// let cmd = parse_special_command("/etc/hosts: what is this file?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/switch").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command.to_lowercase(), rest.trim()),
        None => (lower, ""),
    };

    match command.as_str() {
        "/switch" | "/model" => {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: command.clone(),
                    usage: format!("{} <model_name>", command),
                })
            } else {
                Ok(SpecialCommand::SwitchModel(rest.to_string()))
            }
        }
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        _ => Ok(SpecialCommand::None),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

  /switch <model>  - Use a different model for the next turns
  /model <model>   - Same as /switch
  /status          - Show the session and current model
  /help            - Show this help
  exit, quit       - End the chat and return to the menu

Everything else is sent to the model together with the full history.
"#
    );
}

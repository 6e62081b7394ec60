//! Numbered main menu
//!
//! Shown when the binary runs without a subcommand. Every action reports its
//! own failures and the menu comes back; only `6` (or Ctrl-D) leaves.

use crate::commands::history::{delete_chat, list_chats, report_delete};
use crate::commands::{chat, confirm, export, read_line, AppContext};
use crate::error::Result;
use colored::Colorize;
use rustyline::DefaultEditor;

const DEFAULT_FOLDER: &str = "default";
const DEFAULT_FILENAME: &str = "chat-1";

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewChat,
    ListChats,
    ContinueChat,
    ExportChats,
    DeleteChat,
    Exit,
}

impl MenuChoice {
    /// Parse the number typed at the menu prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::commands::menu::MenuChoice;
    ///
    /// assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::ContinueChat));
    /// assert_eq!(MenuChoice::parse("7"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::NewChat),
            "2" => Some(MenuChoice::ListChats),
            "3" => Some(MenuChoice::ContinueChat),
            "4" => Some(MenuChoice::ExportChats),
            "5" => Some(MenuChoice::DeleteChat),
            "6" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Parse a session id typed by the user; digits only
pub fn parse_session_id(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Trimmed answer, or `default` when blank
pub fn or_default(input: &str, default: &str) -> String {
    match input.trim() {
        "" => default.to_string(),
        answer => answer.to_string(),
    }
}

fn print_menu() {
    println!("\n{}", "Ollama Journal".bold());
    println!("1. Start new chat");
    println!("2. List existing chats");
    println!("3. Continue a chat");
    println!("4. Export all chats to markdown");
    println!("5. Delete a chat");
    println!("6. Exit");
}

/// Run the menu until the user exits
pub async fn run_menu(ctx: &AppContext, rl: &mut DefaultEditor) -> Result<()> {
    loop {
        print_menu();
        let line = match read_line(rl, "Select an option (1-6): ")? {
            Some(line) => line,
            None => break,
        };

        let choice = match MenuChoice::parse(&line) {
            Some(choice) => choice,
            None => {
                println!("{}", "Invalid option. Please choose 1-6.".red());
                continue;
            }
        };

        let result = match choice {
            MenuChoice::NewChat => new_chat(ctx, rl).await,
            MenuChoice::ListChats => list_chats(ctx),
            MenuChoice::ContinueChat => continue_chat(ctx, rl).await,
            MenuChoice::ExportChats => export::run_export(ctx, None),
            MenuChoice::DeleteChat => delete(ctx, rl),
            MenuChoice::Exit => break,
        };

        if let Err(e) = result {
            tracing::debug!("Menu action {:?} failed: {:#}", choice, e);
            eprintln!("{}", format!("Error: {:#}", e).red());
        }
    }

    println!("Goodbye!");
    Ok(())
}

async fn new_chat(ctx: &AppContext, rl: &mut DefaultEditor) -> Result<()> {
    let folder = match read_line(rl, "Enter folder name (default `default`): ")? {
        Some(answer) => or_default(&answer, DEFAULT_FOLDER),
        None => return Ok(()),
    };
    let filename = match read_line(rl, "Enter file name (default `chat-1`): ")? {
        Some(answer) => or_default(&answer, DEFAULT_FILENAME),
        None => return Ok(()),
    };

    chat::run_chat(ctx, rl, &folder, &filename, None).await
}

fn ask_session_id(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<i64>> {
    let answer = match read_line(rl, prompt)? {
        Some(answer) => answer,
        None => return Ok(None),
    };
    let id = parse_session_id(&answer);
    if id.is_none() {
        println!("{}", "Invalid session ID.".red());
    }
    Ok(id)
}

async fn continue_chat(ctx: &AppContext, rl: &mut DefaultEditor) -> Result<()> {
    list_chats(ctx)?;
    match ask_session_id(rl, "Enter the session ID to continue: ")? {
        Some(id) => chat::continue_chat(ctx, rl, id, None).await,
        None => Ok(()),
    }
}

fn delete(ctx: &AppContext, rl: &mut DefaultEditor) -> Result<()> {
    list_chats(ctx)?;
    let id = match ask_session_id(rl, "Enter the session ID to delete: ")? {
        Some(id) => id,
        None => return Ok(()),
    };

    if ctx.storage.get_session(id)?.is_none() {
        println!("{}", format!("Session {} not found.", id).red());
        return Ok(());
    }

    if !confirm(rl, &format!("Delete chat {} and its transcript?", id))? {
        println!("Cancelled.");
        return Ok(());
    }

    report_delete(id, &delete_chat(ctx, id)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choices() {
        let expected = [
            ("1", MenuChoice::NewChat),
            ("2", MenuChoice::ListChats),
            ("3", MenuChoice::ContinueChat),
            ("4", MenuChoice::ExportChats),
            ("5", MenuChoice::DeleteChat),
            ("6", MenuChoice::Exit),
        ];
        for (input, choice) in expected {
            assert_eq!(MenuChoice::parse(input), Some(choice));
        }
    }

    #[test]
    fn test_invalid_menu_choices() {
        for input in ["", "0", "7", "one", "1.", "12"] {
            assert_eq!(MenuChoice::parse(input), None, "input: {}", input);
        }
    }

    #[test]
    fn test_parse_session_id() {
        assert_eq!(parse_session_id("42"), Some(42));
        assert_eq!(parse_session_id("  7\n"), Some(7));
        assert_eq!(parse_session_id("-1"), None);
        assert_eq!(parse_session_id("+1"), None);
        assert_eq!(parse_session_id("abc"), None);
        assert_eq!(parse_session_id(""), None);
        assert_eq!(parse_session_id("99999999999999999999999"), None);
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default("   ", "default"), "default");
        assert_eq!(or_default(" work ", "default"), "work");
    }
}

use crate::commands::AppContext;
use crate::error::Result;
use crate::storage::StoredSession;
use colored::Colorize;
use prettytable::{format, Table};

/// What a delete request found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No session has this id
    NotFound,
    /// The session and its messages were removed
    Deleted {
        session: StoredSession,
        /// Whether a transcript file was removed too
        transcript_removed: bool,
    },
}

/// Print all stored sessions as a table
pub fn list_chats(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.storage.list_sessions()?;

    if sessions.is_empty() {
        println!("{}", "No chats found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Path".bold(),
        "Messages".bold(),
        "Created".bold()
    ]);

    for session in &sessions {
        let count = ctx.storage.message_count(session.id)?;
        table.add_row(prettytable::row![
            session.id.to_string().cyan(),
            session.display_path(),
            count,
            session.created_at
        ]);
    }

    println!("\nExisting Chats:");
    table.printstd();
    println!();
    println!(
        "Use {} to resume a session.",
        "ollama-journal continue <ID>".cyan()
    );
    println!();

    Ok(())
}

/// Delete a session, its messages, and its transcript
///
/// A transcript that cannot be removed is logged; the stored rows are gone
/// either way.
pub fn delete_chat(ctx: &AppContext, session_id: i64) -> Result<DeleteOutcome> {
    let session = match ctx.storage.get_session(session_id)? {
        Some(session) => session,
        None => return Ok(DeleteOutcome::NotFound),
    };

    if !ctx.storage.delete_session(session_id)? {
        return Ok(DeleteOutcome::NotFound);
    }

    let transcript_removed = match ctx
        .mirror
        .delete_transcript(&session.folder, &session.filename)
    {
        Ok(removed) => removed,
        Err(e) => {
            tracing::warn!("Transcript for session {} not removed: {}", session_id, e);
            false
        }
    };

    Ok(DeleteOutcome::Deleted {
        session,
        transcript_removed,
    })
}

/// Print the result of [`delete_chat`]
pub fn report_delete(session_id: i64, outcome: &DeleteOutcome) {
    match outcome {
        DeleteOutcome::NotFound => {
            println!("{}", format!("Session {} not found.", session_id).red());
        }
        DeleteOutcome::Deleted {
            session,
            transcript_removed,
        } => {
            println!(
                "{}",
                format!("Deleted chat {} ({})", session.id, session.display_path()).green()
            );
            if !transcript_removed {
                println!("{}", "No transcript file was found to remove.".yellow());
            }
        }
    }
}

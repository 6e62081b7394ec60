use crate::commands::AppContext;
use crate::error::{JournalError, Result};
use crate::mirror::MarkdownMirror;
use crate::storage::SqliteStorage;
use colored::Colorize;
use std::path::PathBuf;

/// Rewrite transcripts from the database
///
/// Exports every session, or only `only` when given. Existing transcripts
/// are overwritten.
///
/// # Errors
///
/// Returns `JournalError::Storage` if `only` names an unknown session, and
/// the first store or mirror failure otherwise
pub fn export_sessions(
    storage: &SqliteStorage,
    mirror: &MarkdownMirror,
    only: Option<i64>,
) -> Result<Vec<PathBuf>> {
    let sessions = match only {
        Some(id) => vec![storage
            .get_session(id)?
            .ok_or_else(|| JournalError::Storage(format!("Session {} not found", id)))?],
        None => storage.list_sessions()?,
    };

    let mut paths = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let messages = storage.get_messages(session.id)?;
        let path = mirror.export_session(session, &messages)?;
        tracing::debug!(
            "Exported session {} ({} messages) to {}",
            session.id,
            messages.len(),
            path.display()
        );
        paths.push(path);
    }

    Ok(paths)
}

/// Export and print each written path
pub fn run_export(ctx: &AppContext, only: Option<i64>) -> Result<()> {
    let paths = export_sessions(&ctx.storage, &ctx.mirror, only)?;

    if paths.is_empty() {
        println!("{}", "No chats found.".yellow());
        return Ok(());
    }

    for path in &paths {
        println!("{} {}", "Exported:".green(), path.display());
    }
    Ok(())
}

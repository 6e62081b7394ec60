use crate::clock::Clock;
use crate::config::PathsConfig;
use crate::error::{JournalError, Result};
use crate::providers::{Message, Role};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{StoredMessage, StoredSession};

/// Storage backend for chat sessions and their messages
///
/// Every operation opens its own connection and closes it on return.
pub struct SqliteStorage {
    db_path: PathBuf,
    clock: Clock,
}

impl SqliteStorage {
    /// Create a new storage instance in the user's data directory
    pub fn new(clock: Clock) -> Result<Self> {
        let proj_dirs = ProjectDirs::from("io", "ollama-journal", "ollama-journal")
            .ok_or_else(|| JournalError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Self::new_with_path(data_dir.join("chats.db"), clock)
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use ollama_journal::clock::Clock;
    /// use ollama_journal::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("chats.db"), Clock::utc()).unwrap();
    /// assert!(storage.list_sessions().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P, clock: Clock) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;
        }

        let storage = Self { db_path, clock };
        storage.initialize()?;
        Ok(storage)
    }

    /// Open the configured database, or the default one when unset
    pub fn from_config(paths: &PathsConfig, clock: Clock) -> Result<Self> {
        match &paths.db {
            Some(db) => Self::new_with_path(db, clock),
            None => Self::new(clock),
        }
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        // Messages may reference sessions that no longer exist.
        conn.pragma_update(None, "foreign_keys", false)
            .context("Failed to disable foreign key enforcement")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Ok(conn)
    }

    /// Ensure both tables exist; safe to call on every start
    pub fn initialize(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                folder TEXT NOT NULL,
                filename TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                model TEXT,
                timestamp TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id)
            );
            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id);",
        )
        .context("Failed to create tables")
        .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Ok(())
    }

    /// Insert a new session and return its identifier
    ///
    /// Folder and file name are stored as given; the same pair may be
    /// stored more than once.
    pub fn create_session(&self, folder: &str, filename: &str) -> Result<i64> {
        let conn = self.open()?;
        let created_at = self.clock.timestamp();

        conn.execute(
            "INSERT INTO sessions (folder, filename, created_at) VALUES (?, ?, ?)",
            params![folder, filename, created_at],
        )
        .context("Failed to insert session")
        .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Created session {} at {}/{}", id, folder, filename);
        Ok(id)
    }

    /// Insert one message, stamped with the current time
    ///
    /// The session is not checked for existence.
    pub fn save_message(
        &self,
        session_id: i64,
        role: Role,
        content: &str,
        model: Option<&str>,
    ) -> Result<StoredMessage> {
        let conn = self.open()?;
        let timestamp = self.clock.timestamp();

        conn.execute(
            "INSERT INTO messages (session_id, role, content, model, timestamp)
            VALUES (?, ?, ?, ?, ?)",
            params![session_id, role.as_str(), content, model, timestamp],
        )
        .context("Failed to insert message")
        .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Ok(StoredMessage {
            id: conn.last_insert_rowid(),
            session_id,
            role,
            content: content.to_string(),
            model: model.map(str::to_string),
            timestamp,
        })
    }

    /// Role/content history of a session in insertion order
    ///
    /// Unknown sessions yield an empty history.
    pub fn get_history(&self, session_id: i64) -> Result<Vec<Message>> {
        Ok(self
            .get_messages(session_id)?
            .into_iter()
            .map(Message::from)
            .collect())
    }

    /// Full message records of a session in insertion order
    pub fn get_messages(&self, session_id: i64) -> Result<Vec<StoredMessage>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, role, content, model, timestamp
                FROM messages
                WHERE session_id = ?
                ORDER BY id",
            )
            .context("Failed to prepare statement")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        let messages = stmt
            .query_map(params![session_id], message_from_row)
            .context("Failed to query messages")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read message row")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Ok(messages)
    }

    /// Number of messages stored for a session
    pub fn message_count(&self, session_id: i64) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM messages WHERE session_id = ?",
                params![session_id],
                |r| r.get(0),
            )
            .context("Failed to count messages")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;
        Ok(count as usize)
    }

    /// Look up one session
    pub fn get_session(&self, session_id: i64) -> Result<Option<StoredSession>> {
        let conn = self.open()?;

        conn.query_row(
            "SELECT id, folder, filename, created_at FROM sessions WHERE id = ?",
            params![session_id],
            session_from_row,
        )
        .optional()
        .context("Failed to query session")
        .map_err(|e| JournalError::Storage(format!("{:#}", e)).into())
    }

    /// List all stored sessions ordered by identifier
    pub fn list_sessions(&self) -> Result<Vec<StoredSession>> {
        self.query_sessions(
            "SELECT id, folder, filename, created_at FROM sessions ORDER BY id",
            params![],
        )
    }

    /// Sessions already stored under the same folder and file name
    pub fn find_sessions_by_path(&self, folder: &str, filename: &str) -> Result<Vec<StoredSession>> {
        self.query_sessions(
            "SELECT id, folder, filename, created_at FROM sessions
            WHERE folder = ? AND filename = ?
            ORDER BY id",
            params![folder, filename],
        )
    }

    fn query_sessions(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<StoredSession>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(sql)
            .context("Failed to prepare statement")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        let sessions = stmt
            .query_map(params, session_from_row)
            .context("Failed to query sessions")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read session row")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        Ok(sessions)
    }

    /// Delete a session and all of its messages
    ///
    /// Returns whether the session existed. Removing the markdown transcript
    /// is left to the caller.
    pub fn delete_session(&self, session_id: i64) -> Result<bool> {
        let mut conn = self.open()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        let removed_messages = tx
            .execute("DELETE FROM messages WHERE session_id = ?", params![session_id])
            .context("Failed to delete messages")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        let removed_sessions = tx
            .execute("DELETE FROM sessions WHERE id = ?", params![session_id])
            .context("Failed to delete session")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| JournalError::Storage(format!("{:#}", e)))?;

        tracing::debug!(
            "Deleted session {}: {} session row(s), {} message(s)",
            session_id,
            removed_sessions,
            removed_messages
        );

        Ok(removed_sessions > 0)
    }
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<StoredSession> {
    Ok(StoredSession {
        id: row.get(0)?,
        folder: row.get(1)?,
        filename: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<StoredMessage> {
    let role: String = row.get(2)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(StoredMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role,
        content: row.get(3)?,
        model: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

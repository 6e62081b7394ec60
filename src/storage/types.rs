use crate::providers::{Message, Role};
use serde::{Deserialize, Serialize};

/// Metadata for a stored chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Auto-incrementing session identifier
    pub id: i64,
    /// Folder under the chats directory
    pub folder: String,
    /// Transcript file name, without the `.md` extension
    pub filename: String,
    /// When the session was created, formatted in the configured offset
    pub created_at: String,
}

impl StoredSession {
    /// `folder/filename` as shown to the user
    pub fn display_path(&self) -> String {
        format!("{}/{}", self.folder, self.filename)
    }
}

/// One persisted turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Auto-incrementing message identifier; defines order within a session
    pub id: i64,
    /// Owning session
    pub session_id: i64,
    /// Author of the turn
    pub role: Role,
    /// Text of the turn, verbatim
    pub content: String,
    /// Model that produced the turn (assistant turns only)
    pub model: Option<String>,
    /// When the turn was stored, formatted in the configured offset
    pub timestamp: String,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Message {
            role: stored.role,
            content: stored.content,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-user conversation state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub history: Vec<Message>,
    pub has_introduced: bool,
    /// Set when the assistant expects the next message to continue a searched
    /// answer. Dormant: no path sets it yet, but the orchestrator honours it.
    pub pending_followup: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            history: Vec::new(),
            has_introduced: false,
            pending_followup: false,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Appends to the history; history is never truncated
    pub fn add_message(&mut self, message: Message) {
        self.history.push(message);
        self.last_accessed = Utc::now();
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.history.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Checks if this message is from a user
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Checks if this message is from the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

//! Shared data structures modeling a text chat conversation.
//!
//! The wire shape of [`Message`] matches the OpenAI chat-completions schema, so the
//! same value is kept in session history and serialized into request bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
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

/// Role-tagged text message.
///
/// # Examples
///
/// ```
/// use chathub::types::{Message, Role};
///
/// let msg = Message::user("hello");
/// assert_eq!(msg.role, Role::User);
/// assert_eq!(
///     serde_json::to_value(&msg).unwrap(),
///     serde_json::json!({"role": "user", "content": "hello"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Per-session message counters shown by the web front-end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatStats {
    /// Number of user turns in history.
    pub user_messages: usize,
    /// Number of assistant replies in history.
    pub assistant_replies: usize,
}

impl ChatStats {
    /// Counts user and assistant messages, ignoring the system prompt.
    pub fn from_messages(messages: &[Message]) -> Self {
        messages
            .iter()
            .fold(ChatStats::default(), |mut stats, message| {
                match message.role {
                    Role::User => stats.user_messages += 1,
                    Role::Assistant => stats.assistant_replies += 1,
                    Role::System => {}
                }
                stats
            })
    }
}

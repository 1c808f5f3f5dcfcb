//! Stored conversation turns.

use chrono::{DateTime, Utc};

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The configured assistant prompt.
    System,
    /// A turn originating from the chat user.
    User,
    /// A reply produced by the completion backend.
    Assistant,
}

impl Role {
    /// Wire-format name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One stored turn of a conversation.
///
/// Messages are immutable once created; attachment-bearing turns carry a text
/// placeholder instead of binary content.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Author of the turn.
    pub role: Role,
    /// Text content, including any attachment placeholder.
    pub content: String,
    /// Creation time, used for freshness filtering.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message timestamped now.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_message_constructors_set_role() {
        assert_eq!(Message::user("hi").role, Role::User);
        assert_eq!(Message::assistant("hello").role, Role::Assistant);
    }

    #[test]
    fn test_message_timestamped_now() {
        let before = Utc::now();
        let msg = Message::user("hi");
        let after = Utc::now();
        assert!(msg.timestamp >= before && msg.timestamp <= after);
    }
}

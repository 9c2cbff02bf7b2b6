//! Session and message data model
//!
//! A `Session` is one chat conversation; its `messages` are kept in
//! chronological order. The pending-reply sentinel is an ordinary assistant
//! message with its `pending` flag set, so it can never be confused with
//! text loaded from the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept in a session title
pub const TITLE_MAX_CHARS: usize = 20;

/// Display text of the pending-reply sentinel
pub const PENDING_REPLY_TEXT: &str = "Assistant is thinking...";

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user
    User,
    /// Reply produced by the backend
    Assistant,
}

impl Role {
    /// Map a backend history record type to a role
    ///
    /// Only `"user"` maps to [`Role::User`]; every other type is treated as
    /// an assistant message.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::session::Role;
    ///
    /// assert_eq!(Role::from_record_type("user"), Role::User);
    /// assert_eq!(Role::from_record_type("ai"), Role::Assistant);
    /// ```
    pub fn from_record_type(record_type: &str) -> Self {
        if record_type == "user" {
            Self::User
        } else {
            Self::Assistant
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub from: Role,
    /// Display text
    pub text: String,
    /// Marks the transient pending-reply sentinel; never serialized
    #[serde(skip)]
    pub pending: bool,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            from: Role::User,
            text: text.into(),
            pending: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            from: Role::Assistant,
            text: text.into(),
            pending: false,
        }
    }

    /// Create the pending-reply sentinel
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::session::{Message, Role};
    ///
    /// let sentinel = Message::pending_reply();
    /// assert!(sentinel.is_pending());
    /// assert_eq!(sentinel.from, Role::Assistant);
    /// ```
    pub fn pending_reply() -> Self {
        Self {
            from: Role::Assistant,
            text: PENDING_REPLY_TEXT.to_string(),
            pending: true,
        }
    }

    /// Returns true for the pending-reply sentinel
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// One chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier, assigned by the backend or minted locally
    pub id: String,
    /// Short display label
    pub title: String,
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time reported by the backend, when known
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create an empty session with the given id and title
    pub fn new(id: impl Into<String>, title: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            title: truncate_title(title.as_ref()),
            messages: Vec::new(),
            created_at: None,
        }
    }

    /// Mint a brand-new local session whose title comes from its first message
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::session::Session;
    ///
    /// let session = Session::mint("What is retrieval augmented generation?");
    /// assert_eq!(session.title, "What is retrieval au");
    /// assert!(session.messages.is_empty());
    /// ```
    pub fn mint(first_message: &str) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), first_message)
    }

    /// Returns true while the session holds the pending-reply sentinel
    pub fn has_pending_reply(&self) -> bool {
        self.messages.iter().any(Message::is_pending)
    }

    /// Remove every pending-reply sentinel
    pub fn clear_pending_reply(&mut self) {
        self.messages.retain(|m| !m.is_pending());
    }

    /// Number of messages excluding the sentinel
    pub fn message_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_pending()).count()
    }
}

/// Truncate a title to [`TITLE_MAX_CHARS`] characters
///
/// Counts characters rather than bytes so multi-byte text is never split.
///
/// # Examples
///
/// ```
/// use ragchat::session::truncate_title;
///
/// assert_eq!(truncate_title("short"), "short");
/// assert_eq!(truncate_title("什么是检索增强生成？它和微调有什么区别呢？请详细说明"), "什么是检索增强生成？它和微调有什么区别呢");
/// ```
pub fn truncate_title(text: &str) -> String {
    text.chars().take(TITLE_MAX_CHARS).collect()
}

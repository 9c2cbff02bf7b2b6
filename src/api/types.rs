//! Wire types exchanged with the Chat API

use crate::session::{truncate_title, Message, Role, Session};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One record of `GET api/chat/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Backend session id
    pub chat_id: String,
    /// First user message of the session, if any
    #[serde(default)]
    pub preview: Option<String>,
    /// Creation time in unix seconds
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl SessionSummary {
    /// Convert the summary into a session with no messages loaded
    ///
    /// The title is the preview when it is non-empty, otherwise the id,
    /// truncated to the title budget.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::api::SessionSummary;
    ///
    /// let summary = SessionSummary {
    ///     chat_id: "c1".to_string(),
    ///     preview: Some(String::new()),
    ///     created_at: None,
    /// };
    /// assert_eq!(summary.into_session().title, "c1");
    /// ```
    pub fn into_session(self) -> Session {
        let label = match self.preview.as_deref() {
            Some(preview) if !preview.is_empty() => preview,
            _ => self.chat_id.as_str(),
        };
        let title = truncate_title(label);
        Session {
            created_at: self.created_at.and_then(from_unix),
            title,
            id: self.chat_id,
            messages: Vec::new(),
        }
    }
}

/// One entry of a session's stored history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record type, `"user"` for user messages
    #[serde(rename = "type")]
    pub record_type: String,
    /// Message text
    pub content: String,
}

impl HistoryRecord {
    /// Convenience constructor
    pub fn new(record_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            content: content.into(),
        }
    }

    /// Map the record to a display message
    pub fn to_message(&self) -> Message {
        match Role::from_record_type(&self.record_type) {
            Role::User => Message::user(self.content.clone()),
            Role::Assistant => Message::assistant(self.content.clone()),
        }
    }
}

/// Response of `GET api/chat/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistory {
    /// Echo of the requested id
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Stored records, oldest first
    #[serde(default)]
    pub chat_history: Vec<HistoryRecord>,
}

impl SessionHistory {
    /// Map every record to a display message, preserving order
    pub fn messages(&self) -> Vec<Message> {
        self.chat_history.iter().map(HistoryRecord::to_message).collect()
    }

    /// Title derived from the first user record, if there is one
    pub fn derived_title(&self) -> Option<String> {
        self.chat_history
            .iter()
            .find(|r| Role::from_record_type(&r.record_type) == Role::User)
            .map(|r| truncate_title(&r.content))
    }
}

/// Body of `POST api/chat/send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Target session id
    pub session_id: String,
    /// The user's question
    pub question: String,
}

/// Successful response of `POST api/chat/send`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Assistant reply; absent when the backend produced none
    #[serde(default)]
    pub reply: Option<String>,
    /// Full history after the exchange
    #[serde(default)]
    pub chat_history: Vec<HistoryRecord>,
}

/// Error body returned alongside a 429 status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable reason
    pub error: String,
}

/// Convert a unix timestamp to a UTC datetime
pub(crate) fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

//! Chat API collaborator
//!
//! The session store only depends on the [`ChatApi`] trait. [`HttpChatApi`]
//! is the reqwest implementation talking to the question-answering backend.

pub mod http;
pub mod types;

pub use http::HttpChatApi;
pub use types::{ErrorBody, HistoryRecord, SendRequest, SendResponse, SessionHistory, SessionSummary};

use crate::error::Result;
use async_trait::async_trait;

/// Remote chat-history resource
///
/// Implementations report a backend "too many requests" answer to
/// `send_message` as [`crate::error::RagChatError::RateLimited`] so callers
/// can tell it apart from transport and server failures.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// List session summaries
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>>;

    /// Fetch the full history of one session
    async fn get_session(&self, session_id: &str) -> Result<SessionHistory>;

    /// Ask a question within a session
    ///
    /// # Errors
    ///
    /// Returns `RagChatError::RateLimited` when the backend throttles the
    /// request, any other error for transport or server failures.
    async fn send_message(&self, session_id: &str, question: &str) -> Result<SendResponse>;

    /// Delete a session and its history
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

//! Test utilities for ragchat
//!
//! Provides an in-memory [`FakeChatApi`] whose sends can be held open, so
//! tests can act on the store while a reply is still in flight.

use crate::api::{ChatApi, HistoryRecord, SendResponse, SessionHistory, SessionSummary};
use crate::error::{RagChatError, Result};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

type ScriptedReply = std::result::Result<Option<String>, RagChatError>;

#[derive(Default)]
struct FakeSession {
    id: String,
    preview: String,
    history: Vec<HistoryRecord>,
}

/// In-memory Chat API with scripted send results
pub struct FakeChatApi {
    sessions: Mutex<Vec<FakeSession>>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    sent: Mutex<Vec<(String, String)>>,
    fail_lists: AtomicBool,
    fail_gets: AtomicBool,
    fail_deletes: AtomicBool,
    hold: AtomicBool,
    gate: Semaphore,
    sends_started: AtomicUsize,
    get_calls: AtomicUsize,
}

impl Default for FakeChatApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChatApi {
    /// Create an API with no sessions
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            fail_lists: AtomicBool::new(false),
            fail_gets: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            gate: Semaphore::new(0),
            sends_started: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// Register a stored session
    pub fn add_session(&self, id: &str, preview: &str, history: Vec<HistoryRecord>) {
        self.sessions.lock().unwrap().push(FakeSession {
            id: id.to_string(),
            preview: preview.to_string(),
            history,
        });
    }

    /// Queue the result of the next send
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Make `list_sessions` fail
    pub fn fail_lists(&self) {
        self.fail_lists.store(true, Ordering::SeqCst);
    }

    /// Make `get_session` fail
    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    /// Make `delete_session` fail
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Block every send until [`release_sends`](Self::release_sends) is called
    pub fn hold_sends(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Let `count` held sends complete
    pub fn release_sends(&self, count: usize) {
        self.gate.add_permits(count);
    }

    /// Number of sends that reached the API
    pub fn sends_started(&self) -> usize {
        self.sends_started.load(Ordering::SeqCst)
    }

    /// Number of history fetches
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// `(session_id, question)` pairs in the order they were sent
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

fn unavailable(what: &str) -> anyhow::Error {
    RagChatError::Api {
        status: 503,
        message: format!("{} unavailable", what),
    }
    .into()
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(unavailable("list"));
        }
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .map(|s| SessionSummary {
                chat_id: s.id.clone(),
                preview: Some(s.preview.clone()),
                created_at: None,
            })
            .collect())
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionHistory> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(unavailable("history"));
        }
        let history = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| s.history.clone())
            .unwrap_or_default();
        Ok(SessionHistory {
            chat_id: Some(session_id.to_string()),
            chat_history: history,
        })
    }

    async fn send_message(&self, session_id: &str, question: &str) -> Result<SendResponse> {
        self.sends_started.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((session_id.to_string(), question.to_string()));

        if self.hold.load(Ordering::SeqCst) {
            self.gate
                .acquire()
                .await
                .expect("fake send gate closed")
                .forget();
        }

        let scripted = self.replies.lock().unwrap().pop_front();
        match scripted.unwrap_or_else(|| Ok(Some("ok".to_string()))) {
            Ok(reply) => Ok(SendResponse {
                reply,
                chat_history: Vec::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(unavailable("delete"));
        }
        self.sessions.lock().unwrap().retain(|s| s.id != session_id);
        Ok(())
    }
}

/// Yield to other tasks until `condition` holds
///
/// # Panics
///
/// Panics if the condition is still false after many scheduler turns
pub async fn settle_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

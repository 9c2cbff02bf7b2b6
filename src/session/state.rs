//! Synchronous session list state and its transitions
//!
//! `SessionList` holds the sessions, the selection and the set of sessions
//! with a reply in flight. Every transition is a plain method so the send
//! state machine can be exercised without any I/O; the async
//! [`SessionStore`](super::SessionStore) only sequences these transitions
//! around network calls.
//!
//! Invariant: a session holds the pending-reply sentinel if and only if its
//! id is in the pending set.

use super::model::{Message, Session};
use crate::error::RagChatError;
use std::collections::HashSet;

/// Why a send request was ignored without contacting the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The text was empty after trimming
    EmptyText,
    /// The target session already has a reply in flight
    AlreadyPending,
}

/// A send accepted by [`SessionList::begin_send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendTicket {
    /// Session the question belongs to
    pub session_id: String,
    /// Question text as submitted
    pub question: String,
    /// True when the session was minted for this send
    pub created: bool,
}

/// Sessions, selection and pending-send tracker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionList {
    sessions: Vec<Session>,
    selected: Option<String>,
    pending: HashSet<String>,
}

impl SessionList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list holding the given sessions, nothing selected
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions,
            ..Self::default()
        }
    }

    /// All sessions in display order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Owned copy of the sessions
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.clone()
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look a session up by id
    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    fn get_mut(&mut self, session_id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == session_id)
    }

    /// Current list position of a session
    pub fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == session_id)
    }

    /// Id of the session at a list position
    ///
    /// # Errors
    ///
    /// Returns `RagChatError::SessionIndexOutOfRange` when no session sits
    /// at `index`
    pub fn id_at(&self, index: usize) -> Result<String, RagChatError> {
        self.sessions
            .get(index)
            .map(|s| s.id.clone())
            .ok_or(RagChatError::SessionIndexOutOfRange(index))
    }

    /// Id of the selected session
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// List position of the selected session
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_deref().and_then(|id| self.position(id))
    }

    /// The selected session
    pub fn selected_session(&self) -> Option<&Session> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// Returns true while a reply for the session is in flight
    pub fn is_pending(&self, session_id: &str) -> bool {
        self.pending.contains(session_id)
    }

    /// Number of sessions with a reply in flight
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Replace every session, keeping the selection only if it survives
    pub fn replace_all(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        if let Some(id) = self.selected.take() {
            if self.get(&id).is_some() {
                self.selected = Some(id);
            }
        }
    }

    /// Select a session by id; returns false if it is unknown
    pub fn select(&mut self, session_id: &str) -> bool {
        if self.get(session_id).is_none() {
            return false;
        }
        self.selected = Some(session_id.to_string());
        true
    }

    /// Clear the selection so the next send starts a new session
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Replace a session's messages with freshly loaded history
    ///
    /// If the session has a reply in flight the sentinel is appended to the
    /// loaded messages. Returns false, changing nothing, when the session is
    /// no longer in the list.
    pub fn apply_history(
        &mut self,
        session_id: &str,
        mut messages: Vec<Message>,
        title: Option<String>,
    ) -> bool {
        if self.is_pending(session_id) {
            messages.push(Message::pending_reply());
        }
        let Some(session) = self.get_mut(session_id) else {
            return false;
        };
        session.messages = messages;
        if let Some(title) = title {
            session.title = title;
        }
        true
    }

    /// Enter the `Sending` state for the selected session
    ///
    /// Mints and selects a new session first when nothing is selected, then
    /// appends the user message and the sentinel and marks the session
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns the reason the send was ignored; the list is unchanged in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::session::{SessionList, SkipReason};
    ///
    /// let mut list = SessionList::new();
    /// let ticket = list.begin_send("hello").unwrap();
    /// assert!(ticket.created);
    /// assert!(list.is_pending(&ticket.session_id));
    /// assert_eq!(list.begin_send("again"), Err(SkipReason::AlreadyPending));
    /// ```
    pub fn begin_send(&mut self, text: &str) -> Result<SendTicket, SkipReason> {
        if text.trim().is_empty() {
            return Err(SkipReason::EmptyText);
        }

        let mut created = false;
        let existing = self.selected_session().map(|s| s.id.clone());
        let session_id = match existing {
            Some(id) => id,
            None => {
                let session = Session::mint(text);
                let id = session.id.clone();
                self.sessions.push(session);
                self.selected = Some(id.clone());
                created = true;
                id
            }
        };

        if self.is_pending(&session_id) {
            return Err(SkipReason::AlreadyPending);
        }

        if let Some(session) = self.get_mut(&session_id) {
            session.messages.push(Message::user(text));
            session.messages.push(Message::pending_reply());
        }
        self.pending.insert(session_id.clone());

        Ok(SendTicket {
            session_id,
            question: text.to_string(),
            created,
        })
    }

    /// Leave the `Sending` state
    ///
    /// Always clears the pending flag. When the session still exists its
    /// sentinel is removed and `reply`, if any, is appended. Returns false
    /// when the session has been removed in the meantime.
    pub fn finish_send(&mut self, session_id: &str, reply: Option<String>) -> bool {
        self.pending.remove(session_id);
        let Some(session) = self.get_mut(session_id) else {
            return false;
        };
        session.clear_pending_reply();
        if let Some(reply) = reply {
            session.messages.push(Message::assistant(reply));
        }
        true
    }

    /// Remove a session, clearing the selection if it was selected
    ///
    /// The pending flag is left alone; the in-flight send clears it when it
    /// resolves.
    pub fn remove(&mut self, session_id: &str) -> Option<Session> {
        let index = self.position(session_id)?;
        if self.selected.as_deref() == Some(session_id) {
            self.selected = None;
        }
        Some(self.sessions.remove(index))
    }
}

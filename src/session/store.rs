//! Session store: the authoritative view of all chat sessions
//!
//! Every operation is one async function. State is locked only between
//! suspension points, never across an `.await`, and every mutation made
//! after a network call looks its session up again by id. A reply that
//! arrives for a session deleted in the meantime is dropped.

use super::model::Session;
use super::state::{SendTicket, SessionList, SkipReason};
use crate::api::ChatApi;
use crate::error::{RagChatError, Result};
use crate::notify::Notifier;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of [`SessionStore::send_message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent
    Skipped(SkipReason),
    /// The backend answered and the reply was appended
    Replied {
        /// Session the reply belongs to
        session_id: String,
        /// Reply text, empty when the backend sent none
        reply: String,
    },
    /// The backend refused the request as too frequent
    RateLimited {
        /// Session the question was sent in
        session_id: String,
        /// Backend message, already shown through the notifier
        message: String,
    },
    /// Transport or server failure; the user message is kept
    Failed {
        /// Session the question was sent in
        session_id: String,
        /// Error description, already logged
        error: String,
    },
    /// The session was deleted before the request resolved
    Discarded {
        /// Id of the deleted session
        session_id: String,
    },
}

impl SendOutcome {
    /// Session the outcome refers to, if a send was attempted
    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Skipped(_) => None,
            Self::Replied { session_id, .. }
            | Self::RateLimited { session_id, .. }
            | Self::Failed { session_id, .. }
            | Self::Discarded { session_id } => Some(session_id),
        }
    }
}

/// Owns the session list and mediates every change to it
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use ragchat::api::HttpChatApi;
/// use ragchat::config::ApiConfig;
/// use ragchat::notify::TerminalNotifier;
/// use ragchat::session::{SendOutcome, SessionStore};
///
/// # async fn example() -> ragchat::error::Result<()> {
/// let api = HttpChatApi::new(&ApiConfig::default())?;
/// let store = SessionStore::new(Arc::new(api), Arc::new(TerminalNotifier::default()));
/// store.load_session_list().await;
/// if let SendOutcome::Replied { reply, .. } = store.send_message("hello").await {
///     println!("{}", reply);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionStore {
    api: Arc<dyn ChatApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionList>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty store
    pub fn new(api: Arc<dyn ChatApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: Mutex::new(SessionList::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionList> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the whole state, selection and pending flags included
    pub fn snapshot(&self) -> SessionList {
        self.state().clone()
    }

    /// Copy of the sessions in display order
    pub fn sessions(&self) -> Vec<Session> {
        self.state().snapshot()
    }

    /// List position of the selected session
    pub fn selected_index(&self) -> Option<usize> {
        self.state().selected_index()
    }

    /// Copy of the selected session
    pub fn selected_session(&self) -> Option<Session> {
        self.state().selected_session().cloned()
    }

    /// Returns true while a reply for the session is in flight
    pub fn is_pending(&self, session_id: &str) -> bool {
        self.state().is_pending(session_id)
    }

    /// Load the session list from the backend
    ///
    /// Each record becomes a session with no messages. On failure the
    /// error is logged and the list is left empty.
    pub async fn load_session_list(&self) -> Vec<Session> {
        match self.refresh_session_list().await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("Failed to load session list: {:#}", e);
                let mut state = self.state();
                state.replace_all(Vec::new());
                state.snapshot()
            }
        }
    }

    /// Like [`load_session_list`](Self::load_session_list), but a failed
    /// request is returned to the caller and the list is left untouched
    ///
    /// # Errors
    ///
    /// Returns the Chat API error
    pub async fn refresh_session_list(&self) -> Result<Vec<Session>> {
        let sessions: Vec<Session> = self
            .api
            .list_sessions()
            .await?
            .into_iter()
            .map(|s| s.into_session())
            .collect();
        tracing::info!("Loaded {} sessions", sessions.len());

        let mut state = self.state();
        state.replace_all(sessions);
        Ok(state.snapshot())
    }

    /// Load the full history of the session at `index` and select it
    ///
    /// If the session has a reply in flight, the pending-reply sentinel is
    /// appended to the loaded history.
    ///
    /// # Errors
    ///
    /// Returns `RagChatError::SessionIndexOutOfRange` for an unknown
    /// position, or the history-load error (which is also logged); the
    /// selection is unchanged in both cases.
    pub async fn select_session(&self, index: usize) -> Result<Vec<Session>> {
        let session_id = self.state().id_at(index)?;
        self.load_and_select(&session_id).await
    }

    /// Like [`select_session`](Self::select_session), addressing the session by id
    ///
    /// # Errors
    ///
    /// Returns `RagChatError::SessionNotFound` when the id is not in the list
    pub async fn select_session_by_id(&self, session_id: &str) -> Result<Vec<Session>> {
        if self.state().get(session_id).is_none() {
            return Err(RagChatError::SessionNotFound(session_id.to_string()).into());
        }
        self.load_and_select(session_id).await
    }

    async fn load_and_select(&self, session_id: &str) -> Result<Vec<Session>> {
        let history = match self.api.get_session(session_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("Failed to load history for {}: {:#}", session_id, e);
                return Err(e);
            }
        };

        let mut state = self.state();
        if state.apply_history(session_id, history.messages(), history.derived_title()) {
            state.select(session_id);
        } else {
            tracing::debug!("Session {} vanished while loading its history", session_id);
        }
        Ok(state.snapshot())
    }

    /// Send a question in the selected session
    ///
    /// Starts a new session when none is selected. The user message and the
    /// pending-reply sentinel are visible before the request is issued; the
    /// sentinel is removed again however the request ends. A second send to
    /// a session that is still waiting is ignored.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            Ok(ticket) => self.complete_send(ticket).await,
            Err(reason) => SendOutcome::Skipped(reason),
        }
    }

    /// First half of [`send_message`](Self::send_message): the optimistic update
    ///
    /// Appends the user message and the sentinel and marks the session
    /// pending, minting and selecting a session when none is selected.
    /// Callers that spawn the request use this to make the update visible
    /// before the task runs.
    pub fn begin_send(&self, text: &str) -> std::result::Result<SendTicket, SkipReason> {
        let ticket = self.state().begin_send(text).map_err(|reason| {
            tracing::debug!(?reason, "Send ignored");
            reason
        })?;
        if ticket.created {
            tracing::info!("Started new session {}", ticket.session_id);
        }
        Ok(ticket)
    }

    /// Second half of [`send_message`](Self::send_message): issue the request
    /// and reconcile its result into the session named by the ticket
    pub async fn complete_send(&self, ticket: SendTicket) -> SendOutcome {
        let session_id = ticket.session_id;

        let result = self.api.send_message(&session_id, &ticket.question).await;

        let (reply, outcome) = match result {
            Ok(response) => {
                let reply = response.reply.unwrap_or_default();
                (
                    Some(reply.clone()),
                    SendOutcome::Replied {
                        session_id: session_id.clone(),
                        reply,
                    },
                )
            }
            Err(e) => match e.downcast_ref::<RagChatError>() {
                Some(RagChatError::RateLimited(message)) => {
                    tracing::info!("Send to {} rate limited: {}", session_id, message);
                    self.notifier.notify(message);
                    (
                        None,
                        SendOutcome::RateLimited {
                            session_id: session_id.clone(),
                            message: message.clone(),
                        },
                    )
                }
                _ => {
                    tracing::error!("Failed to send message to {}: {:#}", session_id, e);
                    (
                        None,
                        SendOutcome::Failed {
                            session_id: session_id.clone(),
                            error: format!("{:#}", e),
                        },
                    )
                }
            },
        };

        if self.state().finish_send(&session_id, reply) {
            outcome
        } else {
            tracing::debug!("Dropping reply for deleted session {}", session_id);
            SendOutcome::Discarded { session_id }
        }
    }

    /// Switch to a new, not yet created conversation
    ///
    /// The session itself is created by the first send, so abandoning a new
    /// chat leaves nothing behind.
    pub fn start_new_session(&self) {
        self.state().clear_selection();
    }

    /// Delete the session at `index` on the backend and locally
    ///
    /// An in-flight send for the session is not cancelled; its reply is
    /// dropped when it arrives.
    ///
    /// # Errors
    ///
    /// Returns `RagChatError::SessionIndexOutOfRange` for an unknown
    /// position, or the backend error (also logged); the list is unchanged
    /// in both cases.
    pub async fn delete_session(&self, index: usize) -> Result<Vec<Session>> {
        let session_id = self.state().id_at(index)?;

        if let Err(e) = self.api.delete_session(&session_id).await {
            tracing::error!("Failed to delete session {}: {:#}", session_id, e);
            return Err(e);
        }

        let mut state = self.state();
        if state.remove(&session_id).is_some() {
            tracing::info!("Deleted session {}", session_id);
        }
        Ok(state.snapshot())
    }
}

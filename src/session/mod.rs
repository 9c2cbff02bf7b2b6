//! Chat sessions: data model, state transitions and the async store

pub mod model;
pub mod state;
pub mod store;

pub use model::{truncate_title, Message, Role, Session, PENDING_REPLY_TEXT, TITLE_MAX_CHARS};
pub use state::{SendTicket, SessionList, SkipReason};
pub use store::{SendOutcome, SessionStore};

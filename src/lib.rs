//! ragchat - terminal client library for a retrieval-augmented chat backend
//!
//! The library keeps a local mirror of the backend's chat sessions and lets
//! the user keep navigating while replies are still in flight.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session model, state transitions and the async `SessionStore`
//! - `api`: The `ChatApi` seam and its HTTP implementation
//! - `notify`: User-visible notifications (rate limiting)
//! - `view`: Sidebar and conversation rendering
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind each CLI command
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ragchat::{Config, HttpChatApi, SessionStore, TerminalNotifier};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let api = Arc::new(HttpChatApi::new(&config.api)?);
//!     let store = SessionStore::new(api, Arc::new(TerminalNotifier::default()));
//!     store.load_session_list().await;
//!     store.send_message("What is retrieval-augmented generation?").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod view;

// Re-export commonly used types
pub use api::{ChatApi, HttpChatApi};
pub use config::Config;
pub use error::{RagChatError, Result};
pub use notify::{LogNotifier, Notifier, TerminalNotifier};
pub use session::{Message, Role, SendOutcome, Session, SessionList, SessionStore};

#[cfg(test)]
pub mod test_utils;

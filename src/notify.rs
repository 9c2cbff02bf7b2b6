//! User-visible notifications
//!
//! The session store reports recoverable problems the user must see (the
//! backend's rate-limit message) through a [`Notifier`]. Everything else is
//! only logged.
//!
//! One-shot commands report failures through their exit status and error
//! text instead, so they use [`LogNotifier`].

use colored::Colorize;

/// Sink for messages that must reach the user
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show a message to the user
    fn notify(&self, message: &str);
}

/// Prints notifications to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    /// Create a notifier, optionally coloring its output
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        if self.color {
            eprintln!("{}", format!("! {}", message).yellow());
        } else {
            eprintln!("! {}", message);
        }
    }
}

/// Records notifications in the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::debug!(message, "Notification");
    }
}

//! Special commands parser for the interactive chat
//!
//! Special commands drive the sidebar instead of being sent to the backend:
//! - List, open, delete and start sessions
//! - Re-print the current conversation
//! - Collapse or expand the sidebar
//! - Display help and exit
//!
//! Commands are prefixed with `/` and are case-insensitive. Session
//! positions are 1-based, as shown in the sidebar.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during the interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Re-render the session list
    ListSessions,

    /// Load and select the session at a 0-based position
    OpenSession(usize),

    /// Delete the session at a 0-based position
    DeleteSession(usize),

    /// Start a new conversation
    NewSession,

    /// Re-print the selected conversation
    Show,

    /// Collapse or expand the sidebar
    ToggleSidebar,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a question
    None,
}

/// Parse a 1-based position argument into a 0-based index
fn parse_position(command: &str, usage: &str, arg: &str) -> Result<usize, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        });
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
    }
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognized `/` command,
/// `CommandError::MissingArgument` when a position is missing and
/// `CommandError::UnsupportedArgument` when it is not a positive number.
///
/// # Examples
///
/// ```
/// use ragchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/open 2").unwrap(), SpecialCommand::OpenSession(1));
/// assert_eq!(parse_special_command("/NEW").unwrap(), SpecialCommand::NewSession);
/// assert_eq!(parse_special_command("what is RAG?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let mut parts = lower.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or_default().trim();

    match command {
        "/list" | "/ls" | "/sessions" => Ok(SpecialCommand::ListSessions),
        "/open" | "/select" => {
            parse_position("/open", "/open <number>", arg).map(SpecialCommand::OpenSession)
        }
        "/delete" | "/rm" => {
            parse_position("/delete", "/delete <number>", arg).map(SpecialCommand::DeleteSession)
        }
        "/new" => Ok(SpecialCommand::NewSession),
        "/show" => Ok(SpecialCommand::Show),
        "/collapse" | "/sidebar" => Ok(SpecialCommand::ToggleSidebar),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Commands
========

SESSIONS:
  /list           - Show the session list
  /open <n>       - Load session <n> and continue it
  /new            - Start a new chat (created on the first message)
  /delete <n>     - Delete session <n>
  /show           - Print the current conversation

VIEW:
  /collapse       - Collapse or expand the sidebar

OTHER:
  /help           - Show this help
  exit, quit      - Leave the chat

Anything else is sent as a question. Replies arrive in the background,
so you can switch sessions while the assistant is thinking.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("how does hybrid search work").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(parse_special_command("exiting").unwrap(), SpecialCommand::None);
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(parse_special_command("/list").unwrap(), SpecialCommand::ListSessions);
        assert_eq!(parse_special_command("/ls").unwrap(), SpecialCommand::ListSessions);
        assert_eq!(parse_special_command("/open 1").unwrap(), SpecialCommand::OpenSession(0));
        assert_eq!(
            parse_special_command("  /Delete   3 ").unwrap(),
            SpecialCommand::DeleteSession(2)
        );
        assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewSession);
        assert_eq!(parse_special_command("/show").unwrap(), SpecialCommand::Show);
    }

    #[test]
    fn test_view_and_exit_commands() {
        assert_eq!(
            parse_special_command("/collapse").unwrap(),
            SpecialCommand::ToggleSidebar
        );
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("quit").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command("/EXIT").unwrap(), SpecialCommand::Exit);
    }

    #[test]
    fn test_open_requires_position() {
        assert_eq!(
            parse_special_command("/open"),
            Err(CommandError::MissingArgument {
                command: "/open".to_string(),
                usage: "/open <number>".to_string(),
            })
        );
    }

    #[test]
    fn test_position_must_be_positive_number() {
        assert!(matches!(
            parse_special_command("/open 0"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
        assert!(matches!(
            parse_special_command("/delete two"),
            Err(CommandError::UnsupportedArgument { ref arg, .. }) if arg == "two"
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_special_command("/mode write"),
            Err(CommandError::UnknownCommand("/mode".to_string()))
        );
    }

    #[test]
    fn test_error_messages_mention_help() {
        let err = CommandError::UnknownCommand("/x".to_string());
        assert!(err.to_string().contains("/help"));
    }
}

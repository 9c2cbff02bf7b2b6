//! One-shot session commands: list, show, ask and delete

use super::build_store;
use crate::api::{ChatApi, HttpChatApi};
use crate::config::Config;
use crate::error::{RagChatError, Result};
use crate::notify::LogNotifier;
use crate::session::{Message, SendOutcome, Session, SessionStore, SkipReason};
use crate::view::{render_conversation, render_message, ViewConfig};
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

/// Print the session list as a table, or as JSON
pub async fn run_list(config: &Config, json: bool) -> Result<()> {
    let api = HttpChatApi::new(&config.api)?;
    let view = ViewConfig::from_settings(&config.view, None);
    print!("{}", list_sessions(&api, json, &view).await?);
    Ok(())
}

/// Print the history of one session
pub async fn run_show(config: &Config, session_id: &str) -> Result<()> {
    let view = ViewConfig::from_settings(&config.view, None);
    let store = build_store(config, Arc::new(LogNotifier))?;
    println!("{}", show_session(&store, session_id, &view).await?);
    Ok(())
}

/// Ask one question and print the reply
pub async fn run_ask(config: &Config, question: &str, session_id: Option<&str>) -> Result<()> {
    let view = ViewConfig::from_settings(&config.view, None);
    // The rate-limit message reaches the user as this command's error
    let store = build_store(config, Arc::new(LogNotifier))?;
    println!("{}", ask(&store, question, session_id, &view).await?);
    Ok(())
}

/// Delete one session
pub async fn run_delete(config: &Config, session_id: &str) -> Result<()> {
    let view = ViewConfig::from_settings(&config.view, None);
    let store = build_store(config, Arc::new(LogNotifier))?;
    let remaining = delete(&store, session_id).await?;
    let message = format!("Deleted session {} ({} remaining)", session_id, remaining);
    if view.color {
        println!("{}", message.green());
    } else {
        println!("{}", message);
    }
    Ok(())
}

/// Render the backend's session list
///
/// Unlike the interactive chat, a failing list request is an error here.
pub(crate) async fn list_sessions(
    api: &dyn ChatApi,
    json: bool,
    view: &ViewConfig,
) -> Result<String> {
    let sessions: Vec<Session> = api
        .list_sessions()
        .await?
        .into_iter()
        .map(|s| s.into_session())
        .collect();

    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&sessions)?));
    }

    if sessions.is_empty() {
        let message = "No chat sessions found.";
        return Ok(if view.color {
            format!("{}\n", message.yellow())
        } else {
            format!("{}\n", message)
        });
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(prettytable::row!["#", "ID", "Title", "Created"]);

    for (index, session) in sessions.iter().enumerate() {
        let created = session
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(prettytable::row![index + 1, session.id, session.title, created]);
    }

    Ok(table.to_string())
}

pub(crate) async fn show_session(
    store: &SessionStore,
    session_id: &str,
    view: &ViewConfig,
) -> Result<String> {
    store.refresh_session_list().await?;
    store.select_session_by_id(session_id).await?;
    let session = store
        .selected_session()
        .ok_or_else(|| RagChatError::SessionNotFound(session_id.to_string()))?;

    let heading = format!("{} ({})", session.title, session.id);
    let heading = if view.color {
        heading.bold().to_string()
    } else {
        heading
    };
    Ok(format!(
        "{}\n\n{}",
        heading,
        render_conversation(Some(&session), view)
    ))
}

/// Send a question in a new session, or continue `session_id`
///
/// # Errors
///
/// Returns `RagChatError::SessionNotFound` for an unknown session, and the
/// rate-limit or request error when the send does not produce a reply.
pub(crate) async fn ask(
    store: &SessionStore,
    question: &str,
    session_id: Option<&str>,
    view: &ViewConfig,
) -> Result<String> {
    if let Some(id) = session_id {
        store.refresh_session_list().await?;
        store.select_session_by_id(id).await?;
    } else {
        store.start_new_session();
    }

    let target = store.selected_session().map(|s| s.id);
    reply_text(store.send_message(question).await, target, view)
}

/// Turn a send outcome into the printed reply or the command's error
fn reply_text(outcome: SendOutcome, target: Option<String>, view: &ViewConfig) -> Result<String> {
    match outcome {
        SendOutcome::Replied { reply, .. } => Ok(render_message(&Message::assistant(reply), view)),
        SendOutcome::Skipped(SkipReason::EmptyText) => Err(RagChatError::EmptyQuestion.into()),
        SendOutcome::Skipped(SkipReason::AlreadyPending) => {
            Err(RagChatError::ReplyPending(target.unwrap_or_default()).into())
        }
        SendOutcome::RateLimited { message, .. } => Err(RagChatError::RateLimited(message).into()),
        SendOutcome::Failed { error, .. } => Err(anyhow::anyhow!(error)),
        SendOutcome::Discarded { session_id } => {
            Err(RagChatError::SessionNotFound(session_id).into())
        }
    }
}

/// Delete a session by id; returns the number of sessions left
pub(crate) async fn delete(store: &SessionStore, session_id: &str) -> Result<usize> {
    let sessions = store.refresh_session_list().await?;
    let index = sessions
        .iter()
        .position(|s| s.id == session_id)
        .ok_or_else(|| RagChatError::SessionNotFound(session_id.to_string()))?;
    Ok(store.delete_session(index).await?.len())
}

/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive chat with a session sidebar
- `sessions`: One-shot list, show, ask and delete commands

Both sit on top of the library's `SessionStore`; they only render what the
store produces and forward the user's intents to it.
*/

use crate::api::{ChatApi, HttpChatApi};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::{RagChatError, Result};
use crate::notify::{Notifier, TerminalNotifier};
use crate::session::{Message, SendOutcome, SendTicket, SessionStore, SkipReason};
use crate::view::{render_conversation, render_message, render_sidebar, ViewConfig};
use std::sync::Arc;

// Special commands parser for sidebar navigation
pub mod special_commands;

// One-shot session commands
pub mod sessions;

/// Build the store used by every command
fn build_store(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Arc<SessionStore>> {
    let api: Arc<dyn ChatApi> = Arc::new(HttpChatApi::new(&config.api)?);
    Ok(Arc::new(SessionStore::new(api, notifier)))
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Loads the session list, then runs a readline loop. A question's
    //! optimistic update is applied before the prompt returns; the request
    //! itself runs on a spawned task so a slow reply never blocks navigation.
    //! Each reply is printed when it arrives.

    use super::*;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `collapsed` - Start with the sidebar collapsed
    pub async fn run_chat(config: Config, collapsed: bool) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let mut view = ViewConfig::from_settings(&config.view, ViewConfig::terminal_columns());
        if collapsed {
            view.collapsed = true;
        }
        let store = build_store(&config, Arc::new(TerminalNotifier::new(view.color)))?;

        println!("Loading...");
        store.load_session_list().await;

        print_welcome_banner(&view);
        print!("{}", render_sidebar(&store.snapshot(), &view));

        let mut rl = DefaultEditor::new().map_err(|e| RagChatError::Readline(e.to_string()))?;

        loop {
            let prompt = format_prompt(&store, &view);
            // Readline blocks; keep spawned sends running on the other workers
            match tokio::task::block_in_place(|| rl.readline(&prompt)) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e);
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::ListSessions => {
                            print!("{}", render_sidebar(&store.snapshot(), &view));
                            continue;
                        }
                        SpecialCommand::OpenSession(index) => {
                            match store.select_session(index).await {
                                Ok(_) => println!(
                                    "{}\n",
                                    render_conversation(store.selected_session().as_ref(), &view)
                                ),
                                Err(e) => eprintln!("Error: {}\n", e),
                            }
                            continue;
                        }
                        SpecialCommand::DeleteSession(index) => {
                            match store.delete_session(index).await {
                                Ok(_) => print!("{}", render_sidebar(&store.snapshot(), &view)),
                                Err(e) => eprintln!("Error: {}\n", e),
                            }
                            continue;
                        }
                        SpecialCommand::NewSession => {
                            store.start_new_session();
                            println!("{}\n", render_conversation(None, &view));
                            continue;
                        }
                        SpecialCommand::Show => {
                            println!(
                                "{}\n",
                                render_conversation(store.selected_session().as_ref(), &view)
                            );
                            continue;
                        }
                        SpecialCommand::ToggleSidebar => {
                            view.toggle_collapsed();
                            print!("{}", render_sidebar(&store.snapshot(), &view));
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            // Regular question
                        }
                    }

                    if let Err(e) = rl.add_history_entry(trimmed) {
                        tracing::debug!("Failed to record history entry: {}", e);
                    }

                    match store.begin_send(trimmed) {
                        Ok(ticket) => {
                            println!("{}", render_message(&Message::pending_reply(), &view));
                            spawn_send(store.clone(), ticket, view);
                        }
                        Err(reason) => {
                            let skipped = SendOutcome::Skipped(reason);
                            if let Some(text) = describe_outcome(&store, &skipped, &view) {
                                println!("{}\n", text);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Finish an accepted send in the background and print its outcome
    fn spawn_send(store: Arc<SessionStore>, ticket: SendTicket, view: ViewConfig) {
        tokio::spawn(async move {
            let outcome = store.complete_send(ticket).await;
            if let Some(text) = describe_outcome(&store, &outcome, &view) {
                println!("\n{}\n", text);
            }
        });
    }

    /// Text to print once a send resolves, if any
    ///
    /// Rate-limit messages already went through the notifier and failures
    /// were logged, so only replies and refused sends produce output.
    pub(crate) fn describe_outcome(
        store: &SessionStore,
        outcome: &SendOutcome,
        view: &ViewConfig,
    ) -> Option<String> {
        match outcome {
            SendOutcome::Replied { session_id, reply } => {
                let current = store.selected_session();
                match current {
                    Some(session) if &session.id == session_id => {
                        Some(render_message(&Message::assistant(reply.clone()), view))
                    }
                    _ => {
                        let title = store
                            .sessions()
                            .into_iter()
                            .find(|s| &s.id == session_id)
                            .map(|s| s.title)
                            .unwrap_or_default();
                        Some(format!("Reply received in \"{}\" (use /open to read it)", title))
                    }
                }
            }
            SendOutcome::Skipped(SkipReason::AlreadyPending) => {
                Some("Still waiting for the previous reply in this chat".to_string())
            }
            SendOutcome::Skipped(SkipReason::EmptyText)
            | SendOutcome::RateLimited { .. }
            | SendOutcome::Failed { .. }
            | SendOutcome::Discarded { .. } => None,
        }
    }

    fn format_prompt(store: &SessionStore, view: &ViewConfig) -> String {
        let label = store
            .selected_session()
            .map(|s| s.title)
            .unwrap_or_else(|| "new chat".to_string());
        if view.color {
            format!("[{}] > ", label.cyan())
        } else {
            format!("[{}] > ", label)
        }
    }

    fn print_welcome_banner(view: &ViewConfig) {
        let title = "ragchat - ask anything about your documents";
        if view.color {
            println!("\n{}\n", title.bold());
        } else {
            println!("\n{}\n", title);
        }
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

}

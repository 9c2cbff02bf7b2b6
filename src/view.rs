//! View configuration and terminal rendering
//!
//! The view state (sidebar collapse, color) belongs to the presentation
//! layer. The session store never reads it; the renderers here only turn a
//! store snapshot into text.

use crate::config::{ColorChoice, ViewSettings};
use crate::session::{Message, Role, Session, SessionList};
use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

/// Number of title characters shown for a collapsed sidebar row
const COLLAPSED_TITLE_CHARS: usize = 2;

/// Presentation state passed to the renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Sidebar shows abbreviated rows only
    pub collapsed: bool,
    /// Terminal width below which the sidebar starts collapsed
    pub collapse_below_columns: u16,
    /// Emit ANSI colors
    pub color: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::from_settings(&ViewSettings::default(), None)
    }
}

impl ViewConfig {
    /// Build the view state from settings and the terminal width
    ///
    /// The sidebar is collapsed when configured so, or when the terminal is
    /// narrower than `collapse_below_columns`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::config::{ColorChoice, ViewSettings};
    /// use ragchat::view::ViewConfig;
    ///
    /// let settings = ViewSettings { color: ColorChoice::Never, ..Default::default() };
    /// assert!(ViewConfig::from_settings(&settings, Some(40)).collapsed);
    /// assert!(!ViewConfig::from_settings(&settings, Some(120)).collapsed);
    /// ```
    pub fn from_settings(settings: &ViewSettings, columns: Option<u16>) -> Self {
        let narrow = columns.is_some_and(|c| c < settings.collapse_below_columns);
        Self {
            collapsed: settings.collapsed || narrow,
            collapse_below_columns: settings.collapse_below_columns,
            color: resolve_color(settings.color),
        }
    }

    /// Width of the attached terminal
    ///
    /// Falls back to `COLUMNS` when the size cannot be queried, e.g. when
    /// output is not a terminal.
    pub fn terminal_columns() -> Option<u16> {
        let queried = crossterm::terminal::size().ok().map(|(columns, _)| columns);
        pick_columns(queried, std::env::var("COLUMNS").ok().as_deref())
    }

    /// Flip the sidebar between collapsed and expanded; returns the new state
    pub fn toggle_collapsed(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// A queried width wins over the `COLUMNS` value; zero widths are ignored
fn pick_columns(queried: Option<u16>, env_columns: Option<&str>) -> Option<u16> {
    queried
        .filter(|&c| c > 0)
        .or_else(|| env_columns?.trim().parse().ok().filter(|&c: &u16| c > 0))
}

fn resolve_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}

/// Render the numbered session list
///
/// Positions are 1-based. The selected row is marked with `>`, rows with a
/// reply in flight with `…`.
pub fn render_sidebar(list: &SessionList, view: &ViewConfig) -> String {
    let mut out = String::new();
    if !view.collapsed {
        out.push_str(&view.paint("Chats", |s| s.bold()));
        out.push('\n');
    }

    if list.is_empty() {
        if !view.collapsed {
            out.push_str(&view.paint("  No chats yet, type a message to start one", |s| {
                s.dimmed()
            }));
            out.push('\n');
        }
        return out;
    }

    let selected = list.selected_index();
    for (index, session) in list.sessions().iter().enumerate() {
        let marker = if selected == Some(index) { ">" } else { " " };
        let title: String = if view.collapsed {
            session.title.chars().take(COLLAPSED_TITLE_CHARS).collect()
        } else {
            session.title.clone()
        };
        let pending = if list.is_pending(&session.id) { " …" } else { "" };
        let row = format!("{} {}. {}{}", marker, index + 1, title, pending);
        if selected == Some(index) {
            out.push_str(&view.paint(&row, |s| s.cyan().bold()));
        } else {
            out.push_str(&row);
        }
        out.push('\n');
    }
    out
}

/// Render a single message
pub fn render_message(message: &Message, view: &ViewConfig) -> String {
    if message.is_pending() {
        return view.paint(&message.text, |s| s.italic().dimmed());
    }
    match message.from {
        Role::User => format!("{} {}", view.paint("you>", |s| s.green().bold()), message.text),
        Role::Assistant => format!(
            "{} {}",
            view.paint("assistant>", |s| s.blue().bold()),
            message.text
        ),
    }
}

/// Render a conversation, or the welcome prompt for a new chat
pub fn render_conversation(session: Option<&Session>, view: &ViewConfig) -> String {
    match session {
        Some(session) if !session.messages.is_empty() => session
            .messages
            .iter()
            .map(|m| render_message(m, view))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => view.paint("What can I help with?", |s| s.bold()),
    }
}

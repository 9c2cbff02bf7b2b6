//! Command-line interface definition for ragchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat command and one-shot session commands.

use clap::{Parser, Subcommand};

/// ragchat - terminal client for a retrieval-augmented chat backend
///
/// Browse chat sessions, read their history and ask questions.
#[derive(Parser, Debug, Clone)]
#[command(name = "ragchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the Chat API base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ragchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat
    Chat {
        /// Start with the sidebar collapsed
        #[arg(long)]
        collapsed: bool,
    },

    /// List chat sessions
    List {
        /// Print the sessions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the history of a session
    Show {
        /// Session id
        id: String,
    },

    /// Ask a single question and print the reply
    Ask {
        /// The question to send
        question: String,

        /// Continue an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_base: None,
            command: Commands::Chat { collapsed: false },
        }
    }
}

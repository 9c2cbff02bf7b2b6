//! Configuration management for ragchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, RagChatError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for ragchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat API connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Presentation settings
    #[serde(default)]
    pub view: ViewSettings,
}

/// Chat API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `api/chat/...` endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional transport timeout in seconds; none by default
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_user_agent() -> String {
    format!("ragchat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Presentation settings for the terminal client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Start with the sidebar collapsed
    #[serde(default)]
    pub collapsed: bool,

    /// Collapse the sidebar automatically below this terminal width
    #[serde(default = "default_collapse_below_columns")]
    pub collapse_below_columns: u16,

    /// Color output choice
    #[serde(default)]
    pub color: ColorChoice,
}

fn default_collapse_below_columns() -> u16 {
    60
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            collapsed: false,
            collapse_below_columns: default_collapse_below_columns(),
            color: ColorChoice::default(),
        }
    }
}

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl ColorChoice {
    /// Parse a color choice from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ragchat::config::ColorChoice;
    ///
    /// assert_eq!(ColorChoice::parse_str("NEVER").unwrap(), ColorChoice::Never);
    /// assert!(ColorChoice::parse_str("sometimes").is_err());
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "on" => Ok(Self::Always),
            "never" | "off" => Ok(Self::Never),
            other => Err(format!("Unknown color choice: {}", other)),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| RagChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("RAGCHAT_API_BASE") {
            tracing::debug!(base_url = %base_url, "Env override: RAGCHAT_API_BASE");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("RAGCHAT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.api.timeout_seconds = Some(v),
                Err(_) => tracing::warn!("Invalid RAGCHAT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(collapsed) = std::env::var("RAGCHAT_SIDEBAR_COLLAPSED") {
            match collapsed.parse::<bool>() {
                Ok(v) => self.view.collapsed = v,
                Err(_) => tracing::warn!("Invalid RAGCHAT_SIDEBAR_COLLAPSED: {}", collapsed),
            }
        }

        if let Ok(color) = std::env::var("RAGCHAT_COLOR") {
            match ColorChoice::parse_str(&color) {
                Ok(v) => self.view.color = v,
                Err(e) => tracing::warn!("Invalid RAGCHAT_COLOR: {}", e),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(base_url) = &cli.api_base {
            self.api.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL, the timeout is
    /// zero, or the collapse threshold is zero
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(self.api.base_url.trim()).map_err(|e| {
            RagChatError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(RagChatError::Config(format!(
                "api.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == Some(0) {
            return Err(RagChatError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.view.collapse_below_columns == 0 {
            return Err(RagChatError::Config(
                "view.collapse_below_columns must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/");
        assert!(config.api.timeout_seconds.is_none());
        assert!(!config.view.collapsed);
        assert_eq!(config.view.collapse_below_columns, 60);
        assert_eq!(config.view.color, ColorChoice::Auto);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "localhost".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_non_http_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com/".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_threshold() {
        let mut config = Config::default();
        config.view.collapse_below_columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: "https://rag.example.com/app/"
  timeout_seconds: 90
view:
  collapsed: true
  color: never
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://rag.example.com/app/");
        assert_eq!(config.api.timeout_seconds, Some(90));
        assert!(config.api.user_agent.starts_with("ragchat/"));
        assert!(config.view.collapsed);
        assert_eq!(config.view.collapse_below_columns, 60);
        assert_eq!(config.view.color, ColorChoice::Never);
    }

    #[test]
    fn test_color_choice_parse() {
        assert_eq!(ColorChoice::parse_str("auto").unwrap(), ColorChoice::Auto);
        assert_eq!(ColorChoice::parse_str("on").unwrap(), ColorChoice::Always);
        assert_eq!(ColorChoice::parse_str("off").unwrap(), ColorChoice::Never);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = Cli::try_parse_from(["ragchat", "list"]).unwrap();
        let config = Config::load("/nonexistent/ragchat/config.yaml", &cli).unwrap();
        assert_eq!(config.view.collapse_below_columns, 60);
    }

    #[test]
    #[serial]
    fn test_env_and_cli_overrides() {
        std::env::set_var("RAGCHAT_API_BASE", "http://env-host:9000/");
        std::env::set_var("RAGCHAT_TIMEOUT_SECONDS", "15");
        std::env::set_var("RAGCHAT_SIDEBAR_COLLAPSED", "true");
        std::env::set_var("RAGCHAT_COLOR", "bogus");

        let cli = Cli::try_parse_from(["ragchat", "list"]).unwrap();
        let config = Config::load("/nonexistent/ragchat/config.yaml", &cli).unwrap();
        assert_eq!(config.api.base_url, "http://env-host:9000/");
        assert_eq!(config.api.timeout_seconds, Some(15));
        assert!(config.view.collapsed);
        assert_eq!(config.view.color, ColorChoice::Auto);

        let cli = Cli::try_parse_from(["ragchat", "--api-base", "http://cli-host/", "list"]).unwrap();
        let config = Config::load("/nonexistent/ragchat/config.yaml", &cli).unwrap();
        assert_eq!(config.api.base_url, "http://cli-host/");

        std::env::remove_var("RAGCHAT_API_BASE");
        std::env::remove_var("RAGCHAT_TIMEOUT_SECONDS");
        std::env::remove_var("RAGCHAT_SIDEBAR_COLLAPSED");
        std::env::remove_var("RAGCHAT_COLOR");
    }
}

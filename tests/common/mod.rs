use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::MockServer;

use ragchat::config::ApiConfig;
use ragchat::notify::Notifier;
use ragchat::HttpChatApi;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// HTTP client pointed at a mock server
#[allow(dead_code)]
pub fn api_for(server: &MockServer) -> HttpChatApi {
    HttpChatApi::new(&ApiConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .expect("failed to build client")
}

/// Notifier that keeps every message it was given
#[allow(dead_code)]
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

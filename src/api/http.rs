//! HTTP implementation of the Chat API
//!
//! Endpoints are resolved relative to the configured base URL:
//! `api/chat/list`, `api/chat/{id}` (GET and DELETE) and `api/chat/send`.

use super::types::{ErrorBody, SendRequest, SendResponse, SessionHistory, SessionSummary};
use super::ChatApi;
use crate::config::ApiConfig;
use crate::error::{RagChatError, Result};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Message used when a 429 response carries no readable error body
const DEFAULT_RATE_LIMIT_MESSAGE: &str = "Too many requests";

/// reqwest-backed Chat API client
///
/// # Examples
///
/// ```
/// use ragchat::api::HttpChatApi;
/// use ragchat::config::ApiConfig;
///
/// let config = ApiConfig {
///     base_url: "http://localhost:8000".to_string(),
///     ..Default::default()
/// };
/// let api = HttpChatApi::new(&config).unwrap();
/// assert_eq!(api.base_url().as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpChatApi {
    client: Client,
    base: Url,
}

impl HttpChatApi {
    /// Create a client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| {
            RagChatError::Config(format!("Invalid API base URL {}: {}", config.base_url, e))
        })?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| RagChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Chat API client: base={}", base);

        Ok(Self { client, base })
    }

    /// The normalized base URL, always ending in `/`
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join("api/chat/")?.join(path)?)
    }

    fn session_endpoint(&self, session_id: &str) -> Result<Url> {
        let mut url = self.base.join("api/chat/")?;
        url.path_segments_mut()
            .map_err(|_| RagChatError::Config(format!("API base URL cannot hold paths: {}", self.base)))?
            .pop_if_empty()
            .push(session_id);
        Ok(url)
    }
}

/// Turn a non-success response into `RagChatError::Api`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %message, "Chat API returned an error");
    Err(RagChatError::Api {
        status: status.as_u16(),
        message,
    }
    .into())
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let url = self.endpoint("list")?;
        tracing::debug!(%url, "Listing sessions");
        let response = ensure_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionHistory> {
        let url = self.session_endpoint(session_id)?;
        tracing::debug!(%url, "Fetching session history");
        let response = ensure_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_message(&self, session_id: &str, question: &str) -> Result<SendResponse> {
        let url = self.endpoint("send")?;
        let body = SendRequest {
            session_id: session_id.to_string(),
            question: question.to_string(),
        };
        tracing::debug!(%url, session_id, "Sending question");
        let response = self.client.post(url).json(&body).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(e) => {
                    tracing::debug!("Unreadable rate limit body: {}", e);
                    DEFAULT_RATE_LIMIT_MESSAGE.to_string()
                }
            };
            return Err(RagChatError::RateLimited(message).into());
        }

        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let url = self.session_endpoint(session_id)?;
        tracing::debug!(%url, "Deleting session");
        ensure_success(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

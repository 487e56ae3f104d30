//! HTTP chat backend.
//!
//! Talks to a remotely hosted model server exposing `POST /chat` and
//! `GET /health`. The payload is returned untouched: the server is known
//! to double-encode replies or embed actions in free text, which the
//! response normalizer deals with.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::client::ChatBackend;
use super::{BackendError, ChatRequest};
use crate::config::BackendConfig;

pub struct HttpBackend {
    client: Client,
    chat_timeout: Duration,
    health_timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_timeouts(
            Duration::from_secs(config.chat_timeout_secs),
            Duration::from_secs(config.health_timeout_secs),
        )
    }

    pub fn with_timeouts(chat_timeout: Duration, health_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            chat_timeout,
            health_timeout,
        }
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, BackendError> {
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, base_url: &str, request: &ChatRequest<'_>) -> Result<Value, BackendError> {
        if base_url.is_empty() {
            return Err(BackendError::NotConfigured);
        }

        debug!(
            "POST {base_url}/chat with {} messages, {} skills",
            request.messages.len(),
            request.skills.len()
        );

        let response = self
            .client
            .post(format!("{base_url}/chat"))
            .timeout(self.chat_timeout)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn health(&self, base_url: &str) -> Result<Value, BackendError> {
        if base_url.is_empty() {
            return Err(BackendError::NotConfigured);
        }

        let response = self
            .client
            .get(format!("{base_url}/health"))
            .timeout(self.health_timeout)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

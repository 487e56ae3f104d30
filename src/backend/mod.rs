pub mod client;
pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::ChatBackend;
pub use http::HttpBackend;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation history, as sent to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Capability menu entry shown to the remote model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSpec {
    pub name: String,
    pub description: String,
    /// Parameter name → type hint
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// `POST /chat` request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: &'a [ConversationTurn],
    pub skills: &'a [SkillSpec],
}

/// Failures talking to the chat backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend URL is not configured")]
    NotConfigured,
    #[error("cannot reach backend: {0}")]
    Unreachable(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("invalid backend payload: {0}")]
    Decode(String),
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_connect() {
            BackendError::Unreachable(e.to_string())
        } else if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_serialization() {
        let turn = ConversationTurn::user("hello");
        assert_eq!(
            serde_json::to_value(&turn).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
        let turn = ConversationTurn::assistant("hi");
        assert_eq!(serde_json::to_value(&turn).unwrap()["role"], "assistant");
    }

    #[test]
    fn test_chat_request_shape() {
        let messages = vec![ConversationTurn::user("hi")];
        let mut params = serde_json::Map::new();
        params.insert("url".into(), json!("string"));
        let skills = vec![SkillSpec {
            name: "open_url".into(),
            description: "Open a URL".into(),
            params,
        }];
        let body = serde_json::to_value(ChatRequest {
            messages: &messages,
            skills: &skills,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["skills"][0]["name"], "open_url");
        assert_eq!(body["skills"][0]["params"]["url"], "string");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(BackendError::Status(502).to_string(), "backend returned HTTP 502");
        assert_eq!(BackendError::Request("boom".into()).to_string(), "boom");
    }
}

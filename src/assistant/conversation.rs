//! Remote conversation client.
//!
//! Owns the bounded history and turns backend failures into the fixed
//! user-facing replies of the error taxonomy. Only an unparseable payload
//! is returned as an error; the caller treats it as unexpected.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::history::ConversationHistory;
use super::normalizer::{normalize, AssistantReply};
use crate::backend::{BackendError, ChatBackend, ChatRequest, ConversationTurn, SkillSpec};
use crate::skills::SkillName;

pub const NOT_CONFIGURED_REPLY: &str =
    "[Error] AI backend URL is not configured. Set it with /set apiUrl <url>.";
pub const UNREACHABLE_REPLY: &str =
    "[Error] Cannot reach the AI backend. Please confirm it has been started.";
pub const TIMEOUT_REPLY: &str =
    "[Error] The AI backend timed out. Please confirm it is still running.";

/// Result of a health probe. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub connected: bool,
    pub message: String,
}

pub struct ConversationClient {
    backend: Arc<dyn ChatBackend>,
    history: ConversationHistory,
    skills: Vec<SkillSpec>,
}

impl ConversationClient {
    pub fn new(backend: Arc<dyn ChatBackend>, history_limit: usize) -> Self {
        Self {
            backend,
            history: ConversationHistory::new(history_limit),
            skills: SkillName::ALL.iter().map(|s| s.spec()).collect(),
        }
    }

    /// Sends `user_text` with the whole history and skill menu.
    ///
    /// Both the user turn and the assistant turn are recorded, including
    /// when the reply is one of the fixed error strings.
    pub async fn send(&mut self, base_url: &str, user_text: &str) -> Result<AssistantReply, BackendError> {
        self.history.push(ConversationTurn::user(user_text));

        let result = if base_url.is_empty() {
            Err(BackendError::NotConfigured)
        } else {
            let messages = self.history.to_vec();
            let request = ChatRequest {
                messages: &messages,
                skills: &self.skills,
            };
            info!("Sending {} turns to {base_url}/chat", messages.len());
            self.backend.chat(base_url, &request).await
        };

        let reply = match result {
            Ok(raw) => {
                let reply = normalize(raw);
                debug!("Normalized reply: skill={:?}", reply.skill);
                reply
            }
            Err(e @ BackendError::Decode(_)) => return Err(e),
            Err(e) => {
                warn!("Chat request failed: {e}");
                AssistantReply::text(error_reply(&e))
            }
        };

        self.history.push(ConversationTurn::assistant(reply.text.clone()));
        Ok(reply)
    }

    /// One-step memory: the fetched content becomes part of the context of
    /// the next request.
    pub fn record_search_results(&mut self, results: &str) {
        self.history
            .push(ConversationTurn::assistant(format!("Search results found:\n{results}")));
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        if !self.history.is_empty() {
            debug!("Dropping {} turns", self.history.len());
        }
        self.history.clear();
    }
}

/// Fixed reply text for each backend failure.
pub fn error_reply(e: &BackendError) -> String {
    match e {
        BackendError::NotConfigured => NOT_CONFIGURED_REPLY.to_string(),
        BackendError::Unreachable(_) => UNREACHABLE_REPLY.to_string(),
        BackendError::Timeout => TIMEOUT_REPLY.to_string(),
        BackendError::Status(code) => format!("[Error] API: {code}"),
        other => format!("[Error] {other}"),
    }
}

/// Best-effort `GET /health`. No endpoint means no network call.
pub async fn check_health(backend: &dyn ChatBackend, base_url: &str) -> HealthStatus {
    if base_url.is_empty() {
        return HealthStatus {
            connected: false,
            message: "not configured".to_string(),
        };
    }

    match backend.health(base_url).await {
        Ok(payload) => {
            let model = payload
                .get("model")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("AI ready");
            HealthStatus {
                connected: true,
                message: format!("connected - {model}"),
            }
        }
        Err(e) => {
            debug!("Health check failed: {e}");
            HealthStatus {
                connected: false,
                message: "not connected - please start the backend".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::fake::ScriptedBackend;
    use crate::backend::Role;
    use serde_json::json;

    const URL: &str = "http://backend.test";

    fn client(backend: &Arc<ScriptedBackend>) -> ConversationClient {
        ConversationClient::new(backend.clone(), 40)
    }

    #[tokio::test]
    async fn test_send_posts_history_and_skills() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(json!({"text": "hello"}))]));
        let mut client = client(&backend);

        let reply = client.send(URL, "hi").await.unwrap();
        assert_eq!(reply, AssistantReply::text("hello"));

        let body = backend.last_request().unwrap();
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hi"}]));
        assert_eq!(body["skills"].as_array().unwrap().len(), 20);
        assert_eq!(body["skills"][0]["name"], "launch_app");

        let turns = client.history().to_vec();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1], ConversationTurn::assistant("hello"));
    }

    #[tokio::test]
    async fn test_missing_endpoint_makes_no_call() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut client = client(&backend);

        let reply = client.send("", "hi").await.unwrap();
        assert_eq!(reply.text, NOT_CONFIGURED_REPLY);
        assert_eq!(reply.skill, None);
        assert_eq!(backend.chat_calls(), 0);
        assert_eq!(client.history().len(), 2);
    }

    #[tokio::test]
    async fn test_backend_errors_map_to_fixed_replies() {
        let backend = Arc::new(ScriptedBackend::replying(vec![
            Err(BackendError::Unreachable("refused".into())),
            Err(BackendError::Timeout),
            Err(BackendError::Status(503)),
            Err(BackendError::Request("builder error".into())),
        ]));
        let mut client = client(&backend);

        assert_eq!(client.send(URL, "a").await.unwrap().text, UNREACHABLE_REPLY);
        assert_eq!(client.send(URL, "b").await.unwrap().text, TIMEOUT_REPLY);
        assert_eq!(client.send(URL, "c").await.unwrap().text, "[Error] API: 503");
        assert_eq!(client.send(URL, "d").await.unwrap().text, "[Error] builder error");
        assert_eq!(client.history().len(), 8);
    }

    #[tokio::test]
    async fn test_decode_error_propagates_without_assistant_turn() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Err(BackendError::Decode(
            "expected value".into(),
        ))]));
        let mut client = client(&backend);

        let err = client.send(URL, "hi").await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
        let turns = client.history().to_vec();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_history_is_capped_across_turns() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut client = client(&backend);
        for i in 0..30 {
            client.send(URL, &format!("msg {i}")).await.unwrap();
            assert!(client.history().len() <= 40);
        }
        let body = backend.last_request().unwrap();
        assert!(body["messages"].as_array().unwrap().len() <= 40);
        assert_eq!(client.history().to_vec()[0].content, "msg 10");
    }

    #[tokio::test]
    async fn test_embedded_action_reaches_history_as_text() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(json!({
            "text": "On it {\"skill\":\"get_datetime\",\"args\":{}}"
        }))]));
        let mut client = client(&backend);
        let reply = client.send(URL, "time?").await.unwrap();
        assert_eq!(reply.skill.as_deref(), Some("get_datetime"));
        assert_eq!(client.history().to_vec()[1].content, "On it");
    }

    #[tokio::test]
    async fn test_record_search_results() {
        let backend = Arc::new(ScriptedBackend::default());
        let mut client = client(&backend);
        client.record_search_results("[1] a");
        assert_eq!(
            client.history().to_vec()[0],
            ConversationTurn::assistant("Search results found:\n[1] a")
        );
        client.reset();
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_health_without_endpoint_makes_no_call() {
        let backend = ScriptedBackend::default();
        let status = check_health(&backend, "").await;
        assert!(!status.connected);
        assert_eq!(status.message, "not configured");
        assert_eq!(backend.health_calls(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_model() {
        let backend = ScriptedBackend::default().with_health(Ok(json!({"model": "qwen2.5-7b"})));
        let status = check_health(&backend, URL).await;
        assert_eq!(
            status,
            HealthStatus {
                connected: true,
                message: "connected - qwen2.5-7b".into()
            }
        );

        let backend = ScriptedBackend::default();
        assert_eq!(check_health(&backend, URL).await.message, "connected - AI ready");
    }

    #[tokio::test]
    async fn test_health_failure_is_swallowed() {
        let backend = ScriptedBackend::default().with_health(Err(BackendError::Status(500)));
        let status = check_health(&backend, URL).await;
        assert!(!status.connected);
        assert!(status.message.starts_with("not connected"));
    }
}

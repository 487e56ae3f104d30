use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::conversation::{self, ConversationClient, HealthStatus};
use super::dispatch::execute_ai_skill;
use super::intent::IntentMatcher;
use super::TurnOutcome;
use crate::backend::{ChatBackend, ConversationTurn};
use crate::desktop::Desktop;
use crate::settings::SettingsStore;
use crate::skills::{SkillInvocationResult, SkillName, SkillRegistry};

pub const STILL_WAITING_REPLY: &str =
    "Still waiting for the previous reply. Please try again in a moment.";

/// The assistant controller.
///
/// Routes each message through the local intent matcher, falling back to
/// the chat backend, runs the requested skill and records the exchange.
/// At most one message is processed at a time.
pub struct Assistant {
    intents: IntentMatcher,
    conversation: Mutex<ConversationClient>,
    backend: Arc<dyn ChatBackend>,
    desktop: Arc<dyn Desktop>,
    settings: Arc<dyn SettingsStore>,
    registry: SkillRegistry,
    in_flight: Mutex<()>,
}

impl Assistant {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        desktop: Arc<dyn Desktop>,
        settings: Arc<dyn SettingsStore>,
        history_limit: usize,
    ) -> Result<Self> {
        Ok(Self {
            intents: IntentMatcher::new()?,
            conversation: Mutex::new(ConversationClient::new(Arc::clone(&backend), history_limit)),
            registry: SkillRegistry::with_builtins(Arc::clone(&desktop)),
            backend,
            desktop,
            settings,
            in_flight: Mutex::new(()),
        })
    }

    /// Processes one user message. `None` for blank input.
    pub async fn handle_message(&self, text: &str) -> Option<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Message rejected, a request is still pending");
            return Some(TurnOutcome::reply(STILL_WAITING_REPLY, ""));
        };

        // One settings read per request
        let settings = self.settings.snapshot();

        let outcome = match self.intents.match_intent(text) {
            Some(intent) => intent.run(self.desktop.as_ref()).await,
            None => self.ask_backend(&settings.api_url, text).await,
        };

        if settings.tts_enabled && !outcome.speak_text.is_empty() {
            info!(lang = %settings.lang, "Speak: {}", outcome.speak_text);
        }
        Some(outcome)
    }

    async fn ask_backend(&self, api_url: &str, text: &str) -> TurnOutcome {
        let mut conversation = self.conversation.lock().await;

        let reply = match conversation.send(api_url, text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Unexpected backend failure: {e}");
                return TurnOutcome::reply(
                    format!("[Error] Could not reach the AI backend.\n{e}\n\nPlease confirm the backend is running."),
                    "Could not reach the AI backend",
                );
            }
        };

        let Some(skill) = reply.skill.as_deref() else {
            return TurnOutcome::reply(reply.text.clone(), reply.text);
        };

        let result = execute_ai_skill(self.desktop.as_ref(), skill, &reply.args).await;
        if skill == SkillName::FetchNews.as_str() && !result.is_empty() {
            conversation.record_search_results(&result);
        }

        let message = if result.is_empty() {
            reply.text.clone()
        } else {
            format!("{}\n\n{result}", reply.text)
        };
        TurnOutcome::reply(message, reply.text)
    }

    /// Backend status for the configured endpoint.
    pub async fn health(&self) -> HealthStatus {
        let api_url = self.settings.snapshot().api_url;
        conversation::check_health(self.backend.as_ref(), &api_url).await
    }

    /// Runs a registry skill directly, as a quick action.
    pub async fn run_skill(&self, name: &str, args: serde_json::Value) -> SkillInvocationResult {
        info!("Quick action: {name}");
        self.registry.execute(name, args).await
    }

    pub fn registry(&self) -> &SkillRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.conversation.lock().await.history().to_vec()
    }

    pub async fn reset(&self) {
        self.conversation.lock().await.reset();
        info!("Conversation history cleared");
    }
}

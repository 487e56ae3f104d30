//! Builtin skills backed by the desktop.
//!
//! Every catalog entry is registered as a [`DesktopSkill`] that reuses the
//! backend dispatch, so a quick action and a model-requested action behave
//! identically. `set_timer` exists only in the registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{SkillCategory, SkillDefinition, SkillHandler, SkillInvocationResult, SkillName, SkillRegistry};
use crate::assistant::dispatch;
use crate::desktop::Desktop;

/// Longest accepted timer (one day).
const MAX_TIMER_SECS: f64 = 86_400.0;

/// Used when `seconds` is omitted.
const DEFAULT_TIMER_SECS: f64 = 60.0;

const DEFAULT_TIMER_MESSAGE: &str = "Time is up";

pub struct DesktopSkill {
    skill: SkillName,
    desktop: Arc<dyn Desktop>,
}

impl DesktopSkill {
    pub fn new(skill: SkillName, desktop: Arc<dyn Desktop>) -> Self {
        Self { skill, desktop }
    }
}

#[async_trait]
impl SkillHandler for DesktopSkill {
    async fn call(&self, args: Value) -> anyhow::Result<SkillInvocationResult> {
        dispatch::invoke(self.desktop.as_ref(), self.skill, &args).await
    }
}

/// Shows a reminder notification after a delay. Reports immediately.
pub struct TimerSkill {
    desktop: Arc<dyn Desktop>,
}

impl TimerSkill {
    pub fn new(desktop: Arc<dyn Desktop>) -> Self {
        Self { desktop }
    }

    fn definition(desktop: Arc<dyn Desktop>) -> SkillDefinition {
        let mut params = Map::new();
        params.insert("seconds".into(), json!("number"));
        params.insert("message".into(), json!("string"));
        SkillDefinition {
            description: "Set a reminder that shows a notification after the given seconds".into(),
            params,
            handler: Arc::new(Self::new(desktop)),
            category: SkillCategory::Utility,
            confirm_required: false,
        }
    }
}

#[async_trait]
impl SkillHandler for TimerSkill {
    async fn call(&self, args: Value) -> anyhow::Result<SkillInvocationResult> {
        let seconds = match args.get("seconds") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            None | Some(Value::Null) => Some(DEFAULT_TIMER_SECS),
            _ => None,
        };
        let Some(seconds) = seconds.filter(|s| *s > 0.0 && *s <= MAX_TIMER_SECS) else {
            return Ok(SkillInvocationResult::failure(
                "seconds must be a number between 0 and 86400",
            ));
        };
        let message = args
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_TIMER_MESSAGE)
            .to_string();

        info!("Timer set: {seconds}s ({message})");
        let desktop = Arc::clone(&self.desktop);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
            if let Err(e) = desktop.show_notification("Reminder", &message).await {
                warn!("Timer notification failed: {e}");
            }
        });

        Ok(SkillInvocationResult::ok(format!("Timer set for {seconds} seconds")))
    }
}

/// Registers the whole catalog plus `set_timer`, in menu order.
pub fn register_all(registry: &mut SkillRegistry, desktop: Arc<dyn Desktop>) {
    for skill in SkillName::ALL {
        registry.register(
            skill.as_str(),
            SkillDefinition {
                description: skill.description().to_string(),
                params: skill.params_map(),
                handler: Arc::new(DesktopSkill::new(skill, Arc::clone(&desktop))),
                category: skill.category(),
                confirm_required: skill.confirm_required(),
            },
        );
    }
    registry.register("set_timer", TimerSkill::definition(desktop));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::fake::FakeDesktop;

    fn registry() -> (Arc<FakeDesktop>, SkillRegistry) {
        let desktop = Arc::new(FakeDesktop::default());
        let mut registry = SkillRegistry::new();
        register_all(&mut registry, desktop.clone());
        (desktop, registry)
    }

    #[test]
    fn test_all_builtins_registered_in_order() {
        let (_, registry) = registry();
        assert_eq!(registry.list().len(), 21);
        let names: Vec<_> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names.first().map(String::as_str), Some("launch_app"));
        assert_eq!(names.last().map(String::as_str), Some("set_timer"));
    }

    #[test]
    fn test_categories_and_confirmation() {
        let (_, registry) = registry();
        assert!(registry.requires_confirmation("run_command"));
        assert!(registry.requires_confirmation("kill_process"));
        assert!(!registry.requires_confirmation("notify"));
        assert_eq!(registry.get("create_docx").unwrap().category, SkillCategory::Document);
        assert_eq!(registry.get("set_timer").unwrap().category, SkillCategory::Utility);
    }

    #[tokio::test]
    async fn test_desktop_skill_through_registry() {
        let (desktop, registry) = registry();
        let result = registry
            .execute("clipboard_write", json!({"text": "copied"}))
            .await;
        assert!(result.success);
        assert_eq!(desktop.calls(), vec!["clipboard_write(copied)"]);
    }

    #[tokio::test]
    async fn test_bad_arguments_become_failure() {
        let (desktop, registry) = registry();
        let result = registry.execute("open_url", json!({"url": 42})).await;
        assert!(!result.success);
        assert!(result.message.contains("url"));
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_timer_fires_notification() {
        let (desktop, registry) = registry();
        let result = registry
            .execute("set_timer", json!({"seconds": 0.05, "message": "stretch"}))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Timer set for 0.05 seconds");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(desktop.calls(), vec!["show_notification(Reminder|stretch)"]);
    }

    #[tokio::test]
    async fn test_timer_defaults_to_one_minute() {
        let (desktop, registry) = registry();
        let result = registry.execute("set_timer", json!({"message": "tea"})).await;
        assert!(result.success);
        assert_eq!(result.message, "Timer set for 60 seconds");
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_timer_rejects_invalid_seconds() {
        let (_, registry) = registry();
        for args in [json!({"seconds": 0}), json!({"seconds": -1}), json!({"seconds": "soon"}), json!({"seconds": 100000})] {
            let result = registry.execute("set_timer", args).await;
            assert!(!result.success);
        }
    }
}

//! Skill registry.
//!
//! An insertion-ordered map from skill name to definition. Registering an
//! existing name replaces the definition in place (last write wins, the
//! menu position is kept). `execute` is the boundary where handler
//! failures, including panics, become `{success: false}` results.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{SkillCategory, SkillHandler, SkillInvocationResult};
use crate::backend::SkillSpec;
use crate::desktop::Desktop;

pub struct SkillDefinition {
    pub description: String,
    /// Parameter name → type hint
    pub params: Map<String, Value>,
    pub handler: Arc<dyn SkillHandler>,
    pub category: SkillCategory,
    pub confirm_required: bool,
}

pub struct SkillRegistry {
    skills: Vec<(String, SkillDefinition)>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self { skills: Vec::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, definition: SkillDefinition) {
        let name = name.into();
        match self.skills.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => {
                debug!("Replacing skill definition: {name}");
                slot.1 = definition;
            }
            None => self.skills.push((name, definition)),
        }
    }

    /// Registry with every builtin skill.
    pub fn with_builtins(desktop: Arc<dyn Desktop>) -> Self {
        let mut registry = Self::new();
        super::builtin::register_all(&mut registry, desktop);
        registry
    }

    pub fn get(&self, name: &str) -> Option<&SkillDefinition> {
        self.skills
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, def)| def)
    }

    /// Unknown names never need confirmation; they fail on execute.
    pub fn requires_confirmation(&self, name: &str) -> bool {
        self.get(name).is_some_and(|def| def.confirm_required)
    }

    /// Runs the named skill. Never fails: unknown names, handler errors and
    /// handler panics all come back as `success: false`.
    pub async fn execute(&self, name: &str, args: Value) -> SkillInvocationResult {
        let Some(definition) = self.get(name) else {
            return SkillInvocationResult::failure(format!("Skill not found: {name}"));
        };

        debug!("Executing skill {name} with {args}");
        let handler = Arc::clone(&definition.handler);
        match tokio::spawn(async move { handler.call(args).await }).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Skill {name} failed: {e}");
                SkillInvocationResult::failure(e.to_string())
            }
            Err(e) => {
                warn!("Skill {name} aborted: {e}");
                SkillInvocationResult::failure(format!("skill {name} aborted unexpectedly"))
            }
        }
    }

    /// Skill names grouped by category, categories in first-seen order.
    pub fn by_category(&self) -> Vec<(SkillCategory, Vec<&str>)> {
        let mut groups: Vec<(SkillCategory, Vec<&str>)> = Vec::new();
        for (name, def) in &self.skills {
            match groups.iter_mut().find(|(category, _)| *category == def.category) {
                Some((_, names)) => names.push(name),
                None => groups.push((def.category, vec![name])),
            }
        }
        groups
    }

    /// Capability menu in registration order.
    pub fn list(&self) -> Vec<SkillSpec> {
        self.skills
            .iter()
            .map(|(name, def)| SkillSpec {
                name: name.clone(),
                description: def.description.clone(),
                params: def.params.clone(),
            })
            .collect()
    }

    /// One `- name: description (params: {...})` line per skill.
    pub fn to_prompt_description(&self) -> String {
        self.skills
            .iter()
            .map(|(name, def)| {
                format!(
                    "- {name}: {} (params: {})",
                    def.description,
                    Value::Object(def.params.clone())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl SkillHandler for Echo {
        async fn call(&self, args: Value) -> anyhow::Result<SkillInvocationResult> {
            Ok(SkillInvocationResult::ok(format!("echo {}", args["text"])))
        }
    }

    struct Constant(&'static str);

    #[async_trait]
    impl SkillHandler for Constant {
        async fn call(&self, _args: Value) -> anyhow::Result<SkillInvocationResult> {
            Ok(SkillInvocationResult::ok(self.0))
        }
    }

    struct Failing;

    #[async_trait]
    impl SkillHandler for Failing {
        async fn call(&self, _args: Value) -> anyhow::Result<SkillInvocationResult> {
            anyhow::bail!("printer on fire")
        }
    }

    struct Panicking;

    #[async_trait]
    impl SkillHandler for Panicking {
        async fn call(&self, _args: Value) -> anyhow::Result<SkillInvocationResult> {
            panic!("handler bug")
        }
    }

    fn definition(description: &str, handler: Arc<dyn SkillHandler>) -> SkillDefinition {
        let mut params = Map::new();
        params.insert("text".into(), json!("string"));
        SkillDefinition {
            description: description.to_string(),
            params,
            handler,
            category: SkillCategory::Utility,
            confirm_required: false,
        }
    }

    #[tokio::test]
    async fn test_execute_registered_skill() {
        let mut registry = SkillRegistry::new();
        registry.register("echo", definition("Echo text", Arc::new(Echo)));
        let result = registry.execute("echo", json!({"text": "hi"})).await;
        assert!(result.success);
        assert_eq!(result.message, "echo \"hi\"");
    }

    #[tokio::test]
    async fn test_execute_unknown_skill_reports_not_found() {
        let registry = SkillRegistry::new();
        let result = registry.execute("teleport", json!({})).await;
        assert!(!result.success);
        assert!(result.message.contains("not found"));
        assert!(result.message.contains("teleport"));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_failure_result() {
        let mut registry = SkillRegistry::new();
        registry.register("print", definition("Print", Arc::new(Failing)));
        let result = registry.execute("print", json!({})).await;
        assert_eq!(result, SkillInvocationResult::failure("printer on fire"));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_failure_result() {
        let mut registry = SkillRegistry::new();
        registry.register("buggy", definition("Buggy", Arc::new(Panicking)));
        let result = registry.execute("buggy", json!({})).await;
        assert!(!result.success);
        assert!(result.message.contains("buggy"));
    }

    #[tokio::test]
    async fn test_register_overwrites_in_place() {
        let mut registry = SkillRegistry::new();
        registry.register("a", definition("first", Arc::new(Constant("v1"))));
        registry.register("b", definition("other", Arc::new(Constant("b"))));
        registry.register("a", definition("second", Arc::new(Constant("v2"))));

        assert_eq!(registry.list().len(), 2);
        assert_eq!(registry.get("a").unwrap().description, "second");
        assert_eq!(registry.execute("a", json!({})).await.message, "v2");

        let names: Vec<_> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_prompt_description_format() {
        let mut registry = SkillRegistry::new();
        registry.register("echo", definition("Echo text", Arc::new(Echo)));
        registry.register(
            "ping",
            SkillDefinition {
                description: "Ping".into(),
                params: Map::new(),
                handler: Arc::new(Constant("pong")),
                category: SkillCategory::Utility,
                confirm_required: false,
            },
        );
        assert_eq!(
            registry.to_prompt_description(),
            "- echo: Echo text (params: {\"text\":\"string\"})\n- ping: Ping (params: {})"
        );
    }

    #[test]
    fn test_by_category_keeps_first_seen_order() {
        let mut registry = SkillRegistry::new();
        let mut add = |name: &str, category| {
            registry.register(
                name,
                SkillDefinition {
                    description: name.to_string(),
                    params: Map::new(),
                    handler: Arc::new(Constant("x")),
                    category,
                    confirm_required: false,
                },
            )
        };
        add("a", SkillCategory::Web);
        add("b", SkillCategory::File);
        add("c", SkillCategory::Web);
        assert_eq!(
            registry.by_category(),
            vec![(SkillCategory::Web, vec!["a", "c"]), (SkillCategory::File, vec!["b"])]
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = SkillRegistry::default();
        assert!(registry.by_category().is_empty());
        assert!(registry.list().is_empty());
        assert_eq!(registry.to_prompt_description(), "");
    }
}

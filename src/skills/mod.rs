pub mod builtin;
pub mod catalog;
pub mod registry;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use catalog::SkillName;
pub use registry::{SkillDefinition, SkillRegistry};

/// Uniform envelope returned by every skill, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInvocationResult {
    pub success: bool,
    pub message: String,
}

impl SkillInvocationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<anyhow::Result<String>> for SkillInvocationResult {
    fn from(result: anyhow::Result<String>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Classification label shown alongside a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    System,
    Web,
    File,
    Document,
    Utility,
}

impl SkillCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::System => "system",
            SkillCategory::Web => "web",
            SkillCategory::File => "file",
            SkillCategory::Document => "document",
            SkillCategory::Utility => "utility",
        }
    }
}

/// Code behind a registered skill.
///
/// Returning `Err` is allowed: the registry converts it into a
/// `{success: false}` result so callers never see the error itself.
#[async_trait]
pub trait SkillHandler: Send + Sync {
    async fn call(&self, args: Value) -> anyhow::Result<SkillInvocationResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let ok: SkillInvocationResult = Ok::<_, anyhow::Error>("done".to_string()).into();
        assert_eq!(ok, SkillInvocationResult::ok("done"));

        let err: SkillInvocationResult = Err::<String, _>(anyhow::anyhow!("disk full")).into();
        assert!(!err.success);
        assert_eq!(err.message, "disk full");
    }

    #[test]
    fn test_result_serialization() {
        let value = serde_json::to_value(SkillInvocationResult::failure("nope")).unwrap();
        assert_eq!(value, serde_json::json!({"success": false, "message": "nope"}));
    }

    #[test]
    fn test_skill_handler_is_object_safe() {
        fn _assert_object_safe(_: &dyn SkillHandler) {}
    }
}

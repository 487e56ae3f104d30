//! The conversation pipeline: local intents first, then the chat backend,
//! then the requested skill.

pub mod conversation;
pub mod dispatch;
pub mod history;
pub mod intent;
pub mod normalizer;
pub mod runtime;

pub use runtime::Assistant;

/// What one user message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub message: String,
    /// Shorter text for speech output
    pub speak_text: String,
    /// Output of a locally matched skill rather than a backend reply
    pub is_skill: bool,
}

impl TurnOutcome {
    pub fn skill(message: impl Into<String>, speak_text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            speak_text: speak_text.into(),
            is_skill: true,
        }
    }

    pub fn reply(message: impl Into<String>, speak_text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            speak_text: speak_text.into(),
            is_skill: false,
        }
    }
}

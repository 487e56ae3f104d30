//! Line-oriented chat shell on stdin/stdout.
//!
//! Slash commands are intercepted here and never reach the pipeline.

use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use crate::assistant::Assistant;
use crate::backend::Role;
use crate::settings::KEY_API_URL;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Health,
    Skills,
    Skill { name: String, args: Value },
    Get(String),
    Set { key: String, value: String },
    Reload,
    History,
    Reset,
    Quit,
    /// Parse problem or unknown command, with the message to show
    Invalid(String),
}

/// `None` when `line` is a chat message rather than a command.
pub fn parse_command(line: &str) -> Option<ShellCommand> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default().to_lowercase();
    let rest = parts.next().unwrap_or_default().trim();

    let parsed = match command.as_str() {
        "/help" | "/?" => ShellCommand::Help,
        "/health" | "/status" => ShellCommand::Health,
        "/skills" => ShellCommand::Skills,
        "/skill" => parse_skill(rest),
        "/get" if rest.is_empty() => ShellCommand::Invalid("Usage: /get <key>".into()),
        "/get" => ShellCommand::Get(rest.to_string()),
        "/set" => match rest.split_once(char::is_whitespace) {
            Some((key, value)) if !value.trim().is_empty() => ShellCommand::Set {
                key: key.to_string(),
                value: value.trim().to_string(),
            },
            _ => ShellCommand::Invalid("Usage: /set <key> <value>".into()),
        },
        "/reload" => ShellCommand::Reload,
        "/history" => ShellCommand::History,
        "/reset" | "/new" => ShellCommand::Reset,
        "/quit" | "/exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!(
            "Unknown command: {other}\nType /help for available commands."
        )),
    };
    Some(parsed)
}

fn parse_skill(rest: &str) -> ShellCommand {
    let (name, raw_args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    if name.is_empty() {
        return ShellCommand::Invalid("Usage: /skill <name> [json-args]".into());
    }
    let args = if raw_args.is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_str::<Value>(raw_args) {
            Ok(args @ Value::Object(_)) => args,
            Ok(_) => return ShellCommand::Invalid("Skill arguments must be a JSON object".into()),
            Err(e) => return ShellCommand::Invalid(format!("Invalid JSON arguments: {e}")),
        }
    };
    ShellCommand::Skill {
        name: name.to_string(),
        args,
    }
}

pub enum ShellReply {
    Text(String),
    Quit,
}

pub struct Shell {
    assistant: Arc<Assistant>,
    name: String,
}

impl Shell {
    pub fn new(assistant: Arc<Assistant>, name: impl Into<String>) -> Self {
        Self {
            assistant,
            name: name.into(),
        }
    }

    /// Whether the user must confirm before `command` runs.
    pub fn needs_confirmation(&self, command: &ShellCommand) -> bool {
        match command {
            ShellCommand::Skill { name, .. } => self.assistant.registry().requires_confirmation(name),
            _ => false,
        }
    }

    pub async fn handle_command(&self, command: ShellCommand) -> ShellReply {
        info!("Shell command: {command:?}");
        let text = match command {
            ShellCommand::Help => self.help(),
            ShellCommand::Health => {
                let status = self.assistant.health().await;
                format!("Backend: {}", status.message)
            }
            ShellCommand::Skills => {
                let registry = self.assistant.registry();
                let mut text = registry.to_prompt_description();
                text.push('\n');
                for (category, names) in registry.by_category() {
                    text.push_str(&format!("\n[{}] {}", category.as_str(), names.join(", ")));
                }
                text
            }
            ShellCommand::Skill { name, args } => {
                let result = self.assistant.run_skill(&name, args).await;
                if result.success {
                    result.message
                } else {
                    format!("[Failed] {}", result.message)
                }
            }
            ShellCommand::Get(key) => {
                let value = self.assistant.settings().get(&key);
                if value.is_empty() {
                    format!("{key} is not set")
                } else {
                    format!("{key} = {value}")
                }
            }
            ShellCommand::Set { key, value } => match self.assistant.settings().set(&key, &value) {
                Ok(()) if key == KEY_API_URL => {
                    let status = self.assistant.health().await;
                    format!("{key} saved\nBackend: {}", status.message)
                }
                Ok(()) => format!("{key} saved"),
                Err(e) => format!("[Error] Could not save {key}: {e}"),
            },
            ShellCommand::Reload => {
                self.assistant.settings().reload();
                "Settings reloaded.".to_string()
            }
            ShellCommand::History => {
                let turns = self.assistant.history().await;
                if turns.is_empty() {
                    "(no history)".to_string()
                } else {
                    turns
                        .iter()
                        .map(|t| {
                            let who = match t.role {
                                Role::User => "you",
                                Role::Assistant => "assistant",
                            };
                            format!("{who}: {}", t.content)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::Reset => {
                self.assistant.reset().await;
                "Conversation cleared.".to_string()
            }
            ShellCommand::Quit => return ShellReply::Quit,
            ShellCommand::Invalid(message) => message,
        };
        ShellReply::Text(text)
    }

    fn help(&self) -> String {
        format!(
            "{} commands:\n\
             /help                      Show this help\n\
             /health                    Check the AI backend\n\
             /skills                    List available skills\n\
             /skill <name> [json-args]  Run a skill directly\n\
             /get <key>                 Show a setting (apiUrl, tts, lang)\n\
             /set <key> <value>         Change a setting\n\
             /reload                    Re-read the settings file\n\
             /history                   Show the conversation\n\
             /reset                     Clear the conversation\n\
             /quit                      Exit\n\
             Anything else is sent to the assistant.",
            self.name
        )
    }

    /// Reads lines until EOF, `/quit` or Ctrl-C.
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }

    /// Chat loop over any line source. Ends on EOF, `/quit` or Ctrl-C.
    pub async fn serve<R, W>(&self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        emit(&mut out, &format!("{} ready. Type /help for commands.\n", self.name)).await?;

        loop {
            emit(&mut out, "> ").await?;
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, exiting");
                    break;
                }
            };
            let Some(line) = line else { break };

            let output = match parse_command(&line) {
                Some(command) => {
                    if self.needs_confirmation(&command) {
                        emit(&mut out, "This skill needs confirmation. Run it? [y/N] ").await?;
                        let answer = lines.next_line().await?.unwrap_or_default();
                        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                            info!("Skill cancelled by user");
                            emit(&mut out, "Cancelled.\n").await?;
                            continue;
                        }
                    }
                    match self.handle_command(command).await {
                        ShellReply::Text(text) => text,
                        ShellReply::Quit => break,
                    }
                }
                None => {
                    let outcome = tokio::select! {
                        outcome = self.assistant.handle_message(&line) => outcome,
                        _ = tokio::signal::ctrl_c() => {
                            info!("Shutdown signal received, exiting");
                            break;
                        }
                    };
                    match outcome {
                        Some(outcome) => outcome.message,
                        None => continue,
                    }
                }
            };
            emit(&mut out, &format!("{output}\n\n")).await?;
        }

        emit(&mut out, "Bye.\n").await?;
        Ok(())
    }
}

async fn emit<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

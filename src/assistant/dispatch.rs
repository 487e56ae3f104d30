//! Skill execution against the desktop.
//!
//! The backend-triggered path dispatches over the closed [`SkillName`] set;
//! the registry builtins reuse [`invoke`] so both paths behave the same.

use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::desktop::{Desktop, Slide};
use crate::skills::{SkillInvocationResult, SkillName};

/// Upper bound accepted for `fetch_news.max_results`.
const MAX_NEWS_RESULTS: u64 = 20;

/// Runs `skill` with `args`.
///
/// `Err` means the arguments were unusable. A capability failure is not an
/// error here: it comes back as `success: false` with the cause.
pub async fn invoke(desktop: &dyn Desktop, skill: SkillName, args: &Value) -> Result<SkillInvocationResult> {
    let outcome = match skill {
        SkillName::LaunchApp => desktop.launch_app(str_arg(args, "name")?).await,
        SkillName::OpenUrl => desktop.open_url(str_arg(args, "url")?).await,
        SkillName::OpenPath => desktop.open_path(str_arg(args, "path")?).await,
        SkillName::RunCommand => desktop.run_command(str_arg(args, "command")?).await,
        SkillName::ClipboardWrite => desktop.clipboard_write(str_arg(args, "text")?).await,
        SkillName::ClipboardRead => desktop.clipboard_read().await,
        SkillName::SystemInfo => desktop.system_info().await.map(|s| s.summary()),
        SkillName::CreatePpt => {
            let slides: Vec<Slide> = json_arg(args, "slides_json")?;
            let theme = opt_str_arg(args, "theme").unwrap_or("dark");
            desktop
                .create_presentation(str_arg(args, "title")?, &slides, theme)
                .await
        }
        SkillName::CreateDocx => {
            desktop
                .create_document(str_arg(args, "title")?, str_arg(args, "content")?)
                .await
        }
        SkillName::CreateXlsx => {
            let rows: Vec<Vec<Value>> = json_arg(args, "data_json")?;
            let rows: Vec<Vec<String>> = rows
                .into_iter()
                .map(|row| row.into_iter().map(cell_text).collect())
                .collect();
            desktop.create_spreadsheet(str_arg(args, "title")?, &rows).await
        }
        SkillName::WriteFile => {
            desktop
                .write_text_file(str_arg(args, "filename")?, str_arg(args, "content")?)
                .await
        }
        SkillName::ReadFile => desktop.read_text_file(str_arg(args, "filepath")?).await,
        SkillName::ListFiles => {
            desktop
                .list_directory(opt_str_arg(args, "directory").unwrap_or(""))
                .await
        }
        SkillName::TakeScreenshot => desktop.take_screenshot().await,
        SkillName::GetDatetime => Ok(desktop.datetime().full),
        SkillName::SearchWeb => desktop.search_web(str_arg(args, "query")?).await,
        SkillName::FetchNews => {
            // 0 lets the desktop apply its configured default
            let max = match opt_int_arg(args, "max_results")? {
                Some(n) => n.clamp(1, MAX_NEWS_RESULTS as i64) as u8,
                None => 0,
            };
            desktop.fetch_news(str_arg(args, "query")?, max).await
        }
        SkillName::KillProcess => desktop.kill_process(str_arg(args, "process_name")?).await,
        SkillName::SetVolume => {
            let level = opt_int_arg(args, "level")?.ok_or_else(|| anyhow!("missing argument: level"))?;
            // Out-of-range values are rejected by the desktop
            desktop.set_volume(u8::try_from(level).unwrap_or(u8::MAX)).await
        }
        SkillName::Notify => {
            desktop
                .show_notification(str_arg(args, "title")?, str_arg(args, "message")?)
                .await
        }
    };

    if let Err(e) = &outcome {
        warn!("Skill {skill} failed: {e}");
    }
    Ok(SkillInvocationResult::from(outcome))
}

/// Executes a backend-requested skill and returns the text shown under the
/// reply. Never fails: unknown names and bad arguments become messages.
pub async fn execute_ai_skill(desktop: &dyn Desktop, name: &str, args: &Value) -> String {
    let Ok(skill) = name.parse::<SkillName>() else {
        warn!("Backend requested unknown skill: {name}");
        return format!("unknown skill: {name}");
    };

    info!("Dispatching {skill}");
    match invoke(desktop, skill, args).await {
        Ok(result) => result.message,
        Err(e) => format!("skill execution failed: {e}"),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        None | Some(Value::Null) => bail!("missing argument: {key}"),
        Some(other) => bail!("argument {key} must be a string, got {other}"),
    }
}

fn opt_str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Accepts a JSON number or a numeric string.
fn opt_int_arg(args: &Value, key: &str) -> Result<Option<i64>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(Some)
            .ok_or_else(|| anyhow!("argument {key} is not a valid number")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| Some(f.round() as i64))
            .map_err(|_| anyhow!("argument {key} is not a number: {s}")),
        Some(other) => bail!("argument {key} must be a number, got {other}"),
    }
}

/// Accepts either an inline JSON value or a string holding JSON.
fn json_arg<T: serde::de::DeserializeOwned>(args: &Value, key: &str) -> Result<T> {
    let value = match args.get(key) {
        None | Some(Value::Null) => bail!("missing argument: {key}"),
        Some(Value::String(s)) => {
            serde_json::from_str(s).map_err(|e| anyhow!("argument {key} is not valid JSON: {e}"))?
        }
        Some(other) => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| anyhow!("argument {key} has the wrong shape: {e}"))
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

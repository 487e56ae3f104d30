//! Local intent matcher.
//!
//! Recognizes a fixed set of common commands and runs them directly,
//! without a round trip to the chat backend. Patterns are checked in
//! declaration order and the first match wins.

use regex::Regex;
use tracing::{debug, info};

use super::TurnOutcome;
use crate::desktop::Desktop;

struct LaunchPattern {
    phrases: &'static [&'static str],
    app: &'static str,
    label: &'static str,
}

const LAUNCH_PATTERNS: &[LaunchPattern] = &[
    LaunchPattern {
        phrases: &["開啟記事本", "打開記事本", "open notepad"],
        app: "notepad",
        label: "Notepad",
    },
    LaunchPattern {
        phrases: &["開啟計算機", "打開計算機", "open calculator"],
        app: "calculator",
        label: "Calculator",
    },
    LaunchPattern {
        phrases: &["開啟檔案總管", "打開檔案總管", "open explorer"],
        app: "explorer",
        label: "File Explorer",
    },
    LaunchPattern {
        phrases: &["開啟瀏覽器", "打開瀏覽器", "open browser"],
        app: "browser",
        label: "Browser",
    },
    LaunchPattern {
        phrases: &["開啟vscode", "打開vscode", "open vscode", "開啟編輯器"],
        app: "vscode",
        label: "VSCode",
    },
    LaunchPattern {
        phrases: &["開啟終端", "打開終端", "open terminal"],
        app: "terminal",
        label: "Terminal",
    },
    LaunchPattern {
        phrases: &["開啟discord", "打開discord"],
        app: "discord",
        label: "Discord",
    },
    LaunchPattern {
        phrases: &["開啟spotify", "打開spotify"],
        app: "spotify",
        label: "Spotify",
    },
];

const SYSTEM_INFO_PHRASES: &[&str] = &["系統狀態", "系統資訊", "system info", "電腦狀態"];
const CLIPBOARD_PHRASES: &[&str] = &["讀取剪貼簿", "剪貼簿內容", "clipboard", "貼上內容"];
const SCREENSHOT_PHRASES: &[&str] = &["截圖", "螢幕截圖", "screenshot", "截取畫面"];
const DATETIME_PHRASES: &[&str] = &[
    "現在幾點",
    "目前時間",
    "今天日期",
    "幾號",
    "what time",
    "what date",
    "現在時間",
];
const LIST_FILES_PHRASES: &[&str] = &["列出檔案", "檔案列表", "list files", "查看檔案"];

/// "search X then make it into a presentation" style requests
const COMPOSITE_PATTERN: &str = r"(?i)(?:(?:然後|再|接著|並|且).*(?:做成|製作|建立|產生).*(?:簡報|文件|報告|PPT|Word|Excel))|(?:\b(?:then|and)\b.*\b(?:make|turn|create|build)\b.*\b(?:presentation|slides?|document|report|ppt|word|excel)\b)";
const SEARCH_PATTERN: &str = r"(?i)(?:搜尋|搜索|查詢|search|幫我查|幫我搜)\s*(.+)";
const URL_PATTERN: &str = r"(?i)(?:開啟|打開|open)\s*(https?://\S+)";

/// A recognized local command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LaunchApp {
        app: &'static str,
        label: &'static str,
    },
    SystemInfo,
    ClipboardRead,
    Screenshot,
    DateTime,
    Search(String),
    ListFiles,
    OpenUrl(String),
}

pub struct IntentMatcher {
    composite: Regex,
    search: Regex,
    url: Regex,
}

impl IntentMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            composite: Regex::new(COMPOSITE_PATTERN)?,
            search: Regex::new(SEARCH_PATTERN)?,
            url: Regex::new(URL_PATTERN)?,
        })
    }

    /// Classifies `text` without side effects. `None` means the request
    /// should go to the chat backend.
    pub fn match_intent(&self, text: &str) -> Option<Intent> {
        let lower = text.to_lowercase();
        let contains_any = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

        if let Some(pattern) = LAUNCH_PATTERNS.iter().find(|p| contains_any(p.phrases)) {
            return Some(Intent::LaunchApp {
                app: pattern.app,
                label: pattern.label,
            });
        }
        if contains_any(SYSTEM_INFO_PHRASES) {
            return Some(Intent::SystemInfo);
        }
        if contains_any(CLIPBOARD_PHRASES) {
            return Some(Intent::ClipboardRead);
        }
        if contains_any(SCREENSHOT_PHRASES) {
            return Some(Intent::Screenshot);
        }
        if contains_any(DATETIME_PHRASES) {
            return Some(Intent::DateTime);
        }

        // Composite requests need the model to chain fetch_news and a document skill
        if self.composite.is_match(text) {
            debug!("Composite request, leaving search to the backend");
        } else if let Some(query) = self.search.captures(text).and_then(|c| c.get(1)) {
            let query = query.as_str().trim();
            if !query.is_empty() {
                return Some(Intent::Search(query.to_string()));
            }
        }

        if contains_any(LIST_FILES_PHRASES) {
            return Some(Intent::ListFiles);
        }
        if let Some(url) = self.url.captures(text).and_then(|c| c.get(1)) {
            return Some(Intent::OpenUrl(url.as_str().to_string()));
        }
        None
    }
}

impl Intent {
    /// Runs the intent against the desktop. Capability failures become the
    /// displayed message; nothing is propagated.
    pub async fn run(&self, desktop: &dyn Desktop) -> TurnOutcome {
        info!("Local intent: {self:?}");
        match self {
            Intent::LaunchApp { app, label } => match desktop.launch_app(app).await {
                Ok(_) => TurnOutcome::skill(
                    format!("Opened {label} for you"),
                    format!("Opened {label}"),
                ),
                Err(e) => failed(e),
            },
            Intent::SystemInfo => match desktop.system_info().await {
                Ok(snapshot) => TurnOutcome::skill(
                    snapshot.summary(),
                    format!("Your computer has {} CPU cores", snapshot.cpus),
                ),
                Err(e) => failed(e),
            },
            Intent::ClipboardRead => match desktop.clipboard_read().await {
                Ok(text) => {
                    let text = if text.is_empty() { "(empty)".to_string() } else { text };
                    TurnOutcome::skill(format!("Clipboard:\n{text}"), "Read the clipboard")
                }
                Err(e) => failed(e),
            },
            Intent::Screenshot => match desktop.take_screenshot().await {
                Ok(message) => TurnOutcome::skill(message, "Screenshot taken"),
                Err(e) => failed(e),
            },
            Intent::DateTime => {
                let full = desktop.datetime().full;
                TurnOutcome::skill(full.clone(), full)
            }
            Intent::Search(query) => match desktop.search_web(query).await {
                Ok(_) => TurnOutcome::skill(format!("Searched: {query}"), format!("Searched {query}")),
                Err(e) => failed(e),
            },
            Intent::ListFiles => match desktop.list_directory("").await {
                Ok(listing) => TurnOutcome::skill(format!("Workspace files:\n{listing}"), "Listed files"),
                Err(e) => failed(e),
            },
            Intent::OpenUrl(url) => match desktop.open_url(url).await {
                Ok(_) => TurnOutcome::skill(format!("Opened: {url}"), "Opened the link"),
                Err(e) => failed(e),
            },
        }
    }
}

fn failed(e: anyhow::Error) -> TurnOutcome {
    TurnOutcome::skill(e.to_string(), "That did not work")
}

//! The closed set of skills the remote model may request.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::SkillCategory;
use crate::backend::SkillSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillName {
    LaunchApp,
    OpenUrl,
    OpenPath,
    RunCommand,
    ClipboardWrite,
    ClipboardRead,
    SystemInfo,
    CreatePpt,
    CreateDocx,
    CreateXlsx,
    WriteFile,
    ReadFile,
    ListFiles,
    TakeScreenshot,
    GetDatetime,
    SearchWeb,
    FetchNews,
    KillProcess,
    SetVolume,
    Notify,
}

impl SkillName {
    /// Declaration order, which is also the order of the capability menu.
    pub const ALL: [SkillName; 20] = [
        SkillName::LaunchApp,
        SkillName::OpenUrl,
        SkillName::OpenPath,
        SkillName::RunCommand,
        SkillName::ClipboardWrite,
        SkillName::ClipboardRead,
        SkillName::SystemInfo,
        SkillName::CreatePpt,
        SkillName::CreateDocx,
        SkillName::CreateXlsx,
        SkillName::WriteFile,
        SkillName::ReadFile,
        SkillName::ListFiles,
        SkillName::TakeScreenshot,
        SkillName::GetDatetime,
        SkillName::SearchWeb,
        SkillName::FetchNews,
        SkillName::KillProcess,
        SkillName::SetVolume,
        SkillName::Notify,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkillName::LaunchApp => "launch_app",
            SkillName::OpenUrl => "open_url",
            SkillName::OpenPath => "open_path",
            SkillName::RunCommand => "run_command",
            SkillName::ClipboardWrite => "clipboard_write",
            SkillName::ClipboardRead => "clipboard_read",
            SkillName::SystemInfo => "system_info",
            SkillName::CreatePpt => "create_ppt",
            SkillName::CreateDocx => "create_docx",
            SkillName::CreateXlsx => "create_xlsx",
            SkillName::WriteFile => "write_file",
            SkillName::ReadFile => "read_file",
            SkillName::ListFiles => "list_files",
            SkillName::TakeScreenshot => "take_screenshot",
            SkillName::GetDatetime => "get_datetime",
            SkillName::SearchWeb => "search_web",
            SkillName::FetchNews => "fetch_news",
            SkillName::KillProcess => "kill_process",
            SkillName::SetVolume => "set_volume",
            SkillName::Notify => "notify",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SkillName::LaunchApp => "Launch a local application",
            SkillName::OpenUrl => "Open a URL in the browser",
            SkillName::OpenPath => "Open a local file or folder",
            SkillName::RunCommand => "Run a shell command",
            SkillName::ClipboardWrite => "Write text to the clipboard",
            SkillName::ClipboardRead => "Read the clipboard",
            SkillName::SystemInfo => "Get system information (CPU, memory, uptime)",
            SkillName::CreatePpt => {
                "Create a presentation. theme is one of: dark (tech), corporate (white business), \
                 nature (green), warm, ocean (blue), minimal (black and white); pick the one that \
                 best fits the topic."
            }
            SkillName::CreateDocx => "Create a document",
            SkillName::CreateXlsx => "Create a spreadsheet",
            SkillName::WriteFile => "Write a text file",
            SkillName::ReadFile => "Read a file's content",
            SkillName::ListFiles => "List files in a directory",
            SkillName::TakeScreenshot => "Take a screenshot",
            SkillName::GetDatetime => "Get the current date and time",
            SkillName::SearchWeb => "Search the web in the browser",
            SkillName::FetchNews => {
                "Search the web and return content summaries (use it to gather material \
                 before building a presentation or document)"
            }
            SkillName::KillProcess => "Terminate a process by name",
            SkillName::SetVolume => "Set the system volume (0-100)",
            SkillName::Notify => "Show a desktop notification",
        }
    }

    /// Parameter name → type hint, as shown to the model.
    pub fn params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            SkillName::LaunchApp => &[("name", "string")],
            SkillName::OpenUrl => &[("url", "string")],
            SkillName::OpenPath => &[("path", "string")],
            SkillName::RunCommand => &[("command", "string")],
            SkillName::ClipboardWrite => &[("text", "string")],
            SkillName::CreatePpt => &[
                ("title", "string"),
                ("slides_json", r#"[{"title":"...","content":"..."}]"#),
                ("theme", "string"),
            ],
            SkillName::CreateDocx => &[("title", "string"), ("content", "string")],
            SkillName::CreateXlsx => &[
                ("title", "string"),
                ("data_json", r#"[["col1","col2"],["val1","val2"]]"#),
            ],
            SkillName::WriteFile => &[("filename", "string"), ("content", "string")],
            SkillName::ReadFile => &[("filepath", "string")],
            SkillName::ListFiles => &[("directory", "string")],
            SkillName::SearchWeb => &[("query", "string")],
            SkillName::FetchNews => &[("query", "string"), ("max_results", "number (default 5)")],
            SkillName::KillProcess => &[("process_name", "string")],
            SkillName::SetVolume => &[("level", "number")],
            SkillName::Notify => &[("title", "string"), ("message", "string")],
            SkillName::ClipboardRead
            | SkillName::SystemInfo
            | SkillName::TakeScreenshot
            | SkillName::GetDatetime => &[],
        }
    }

    pub fn params_map(self) -> Map<String, Value> {
        self.params()
            .iter()
            .map(|(name, hint)| (name.to_string(), Value::String(hint.to_string())))
            .collect()
    }

    pub fn category(self) -> SkillCategory {
        match self {
            SkillName::OpenUrl | SkillName::SearchWeb | SkillName::FetchNews => SkillCategory::Web,
            SkillName::OpenPath
            | SkillName::WriteFile
            | SkillName::ReadFile
            | SkillName::ListFiles => SkillCategory::File,
            SkillName::CreatePpt | SkillName::CreateDocx | SkillName::CreateXlsx => {
                SkillCategory::Document
            }
            SkillName::GetDatetime | SkillName::Notify => SkillCategory::Utility,
            SkillName::LaunchApp
            | SkillName::RunCommand
            | SkillName::ClipboardWrite
            | SkillName::ClipboardRead
            | SkillName::SystemInfo
            | SkillName::TakeScreenshot
            | SkillName::KillProcess
            | SkillName::SetVolume => SkillCategory::System,
        }
    }

    /// Skills that must be confirmed by the user before running from the shell.
    pub fn confirm_required(self) -> bool {
        matches!(self, SkillName::RunCommand | SkillName::KillProcess)
    }

    pub fn spec(self) -> SkillSpec {
        SkillSpec {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            params: self.params_map(),
        }
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillName::ALL
            .iter()
            .copied()
            .find(|skill| skill.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

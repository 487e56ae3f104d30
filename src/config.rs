use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Output directory for generated files. Supports `~` and ${ENV_VAR}.
    #[serde(default = "default_workspace")]
    pub workspace: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Open generated documents once they are written
    #[serde(default = "default_true")]
    pub auto_open: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_chat_timeout")]
    pub chat_timeout_secs: u64,
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    /// Ceiling for `run_command`
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
    /// Ceiling for notification, volume and screenshot helpers
    #[serde(default = "default_script_timeout")]
    pub script_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkillsConfig {
    /// Search provider backing `fetch_news`. Absent means the skill reports
    /// that it is not configured.
    pub news: Option<NewsConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewsConfig {
    pub provider: String,
    /// Supports ${ENV_VAR} substitution
    pub api_key: String,
    #[serde(default = "default_max_results")]
    pub max_results: u8,
    /// Ceiling for one search request
    #[serde(default = "default_news_timeout")]
    pub timeout_secs: u64,
}

fn default_name() -> String {
    "Desk Assistant".to_string()
}

fn default_workspace() -> String {
    "~/AssistantOutput".to_string()
}

fn default_history_limit() -> usize {
    40
}

fn default_true() -> bool {
    true
}

fn default_chat_timeout() -> u64 {
    30
}

fn default_health_timeout() -> u64 {
    5
}

fn default_command_timeout() -> u64 {
    15
}

fn default_script_timeout() -> u64 {
    10
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("./data/settings.json")
}

fn default_max_results() -> u8 {
    5
}

fn default_news_timeout() -> u64 {
    30
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            workspace: default_workspace(),
            history_limit: default_history_limit(),
            auto_open: true,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            chat_timeout_secs: default_chat_timeout(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            script_timeout_secs: default_script_timeout(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

impl AssistantConfig {
    /// Workspace directory with `~` expanded
    pub fn workspace_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.workspace).into_owned())
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads `path`, or falls back to built-in defaults when `path` is the
    /// implicit default location and nothing exists there.
    pub fn load_or_default(path: &str, explicit: bool) -> anyhow::Result<Self> {
        if !explicit && !Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        // Expand environment variables like ${TAVILY_API_KEY}
        let expanded = shellexpand::env(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }
}

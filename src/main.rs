mod assistant;
mod backend;
mod config;
mod desktop;
mod settings;
mod shell;
mod skills;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::assistant::Assistant;
use crate::backend::HttpBackend;
use crate::config::Config;
use crate::desktop::SystemDesktop;
use crate::settings::{JsonFileSettings, SettingsStore};
use crate::shell::Shell;

const DEFAULT_CONFIG_PATH: &str = "config/assistant.toml";

fn print_help() {
    println!(
        "\
desk-assistant v{}

A desktop assistant that runs common commands locally and hands
everything else to a remote chat backend that can request desktop skills.

USAGE:
    desk-assistant [OPTIONS] [CONFIG_PATH]

ARGUMENTS:
    CONFIG_PATH    Path to TOML configuration file [default: {DEFAULT_CONFIG_PATH}]
                   Built-in defaults are used when the default file is missing.

OPTIONS:
    -h, --help       Print this help message and exit
    -V, --version    Print version and exit

ENVIRONMENT VARIABLES:
    Variables are referenced in the config file via ${{VAR_NAME}} syntax.

    RUST_LOG          Log level filter for tracing
                      (e.g. debug, desk_assistant=debug,warn)
    TAVILY_API_KEY    API key for the fetch_news skill
                      (from https://tavily.com)

SETTINGS:
    The backend URL and speech options live in the settings file
    ([settings] path) and can be changed from the shell:
        /set apiUrl https://my-backend.example
        /set tts off

EXAMPLES:
    desk-assistant                            # uses {DEFAULT_CONFIG_PATH}
    desk-assistant ~/.config/assistant.toml   # custom config path
    RUST_LOG=debug desk-assistant             # with debug logging",
        env!("CARGO_PKG_VERSION"),
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --help / --version before anything else
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("desk-assistant v{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
    }

    // Logs go to stderr so the chat on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("desk_assistant=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    info!("Loading configuration from {config_path}");
    let config = Config::load_or_default(&config_path, explicit_path.is_some())?;

    info!("Assistant: {}", config.assistant.name);
    info!("Workspace: {}", config.assistant.workspace_dir().display());
    info!("Settings file: {}", config.settings.path.display());

    let settings = Arc::new(JsonFileSettings::open(&config.settings.path));
    let desktop = Arc::new(SystemDesktop::new(&config)?);
    let backend = Arc::new(HttpBackend::new(&config.backend));

    let assistant = Arc::new(Assistant::new(
        backend,
        desktop,
        settings.clone(),
        config.assistant.history_limit,
    )?);
    let skill_names: Vec<String> = assistant.registry().list().into_iter().map(|s| s.name).collect();
    info!("Skills: {} registered ({})", skill_names.len(), skill_names.join(", "));

    let api_url = settings.snapshot().api_url;
    if api_url.is_empty() {
        warn!("AI backend URL is not configured, use /set apiUrl <url>");
    } else {
        let status = assistant.health().await;
        if status.connected {
            info!("Backend {api_url}: {}", status.message);
        } else {
            warn!("Backend {api_url}: {}", status.message);
        }
    }

    Shell::new(assistant, config.assistant.name.clone()).run().await
}

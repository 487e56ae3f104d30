//! The real OS bridge.
//!
//! Long-running helpers (shell commands, screenshot/volume/notification
//! tools) run under a timeout; a timeout is reported like any other failure.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use sysinfo::System;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::documents::{output_file_name, render_document, render_presentation, render_spreadsheet};
use super::news::{self, NewsProvider};
use super::{DateTimeInfo, Desktop, Slide, SystemSnapshot};
use crate::config::Config;

/// Maximum characters returned by `read_text_file`.
const MAX_READ_CHARS: usize = 10_000;

/// Maximum entries returned by `list_directory`.
const MAX_LIST_ENTRIES: usize = 50;

pub struct SystemDesktop {
    workspace: PathBuf,
    auto_open: bool,
    command_timeout: Duration,
    script_timeout: Duration,
    news: Option<Box<dyn NewsProvider>>,
    news_max_results: u8,
}

/// What `launch_app` resolves a friendly name to.
#[derive(Debug, PartialEq)]
enum LaunchTarget {
    Url(String),
    Program(String),
}

impl SystemDesktop {
    pub fn new(config: &Config) -> Result<Self> {
        let workspace = config.assistant.workspace_dir();
        std::fs::create_dir_all(&workspace)
            .with_context(|| format!("cannot create workspace {}", workspace.display()))?;

        let (news, news_max_results) = match &config.skills.news {
            Some(news_config) => {
                let provider = news::from_config(news_config)?;
                info!("News search provider: {}", provider.provider_name());
                (Some(provider), news_config.max_results)
            }
            None => (None, 5),
        };

        Ok(Self {
            workspace,
            auto_open: config.assistant.auto_open,
            command_timeout: Duration::from_secs(config.system.command_timeout_secs),
            script_timeout: Duration::from_secs(config.system.script_timeout_secs),
            news,
            news_max_results,
        })
    }

    fn stamp() -> String {
        chrono::Local::now().format("%H%M%S").to_string()
    }

    async fn save_output(&self, file_name: String, content: String) -> Result<String> {
        tokio::fs::create_dir_all(&self.workspace).await?;
        let path = self.workspace.join(file_name);
        tokio::fs::write(&path, content).await?;
        info!("Wrote {}", path.display());

        if self.auto_open {
            if let Err(e) = open::that_detached(&path) {
                warn!("Could not open {}: {e}", path.display());
            }
            return Ok(format!("Created and opened: {}", path.display()));
        }
        Ok(format!("Created: {}", path.display()))
    }

    /// Runs `program args...` under `limit`, returning trimmed stdout on
    /// success and stderr (or the exit status) as the failure cause.
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<String> {
        debug!("Running {program} {args:?}");
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => bail!("timed out after {}s", limit.as_secs()),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            Ok(if stdout.is_empty() { stderr } else { stdout })
        } else if !stderr.is_empty() {
            Err(anyhow!(stderr))
        } else if !stdout.is_empty() {
            Err(anyhow!(stdout))
        } else {
            Err(anyhow!("{program} exited with {}", output.status))
        }
    }

    /// Tries each candidate tool in order, skipping ones that are not installed.
    async fn run_first(&self, candidates: Vec<(&str, Vec<String>)>, limit: Duration) -> Result<String> {
        let mut tried = Vec::new();
        for (program, args) in candidates {
            match self.run(program, &args, limit).await {
                Err(e) if is_not_found(&e) => tried.push(program.to_string()),
                other => return other,
            }
        }
        bail!("no suitable tool found (tried {})", tried.join(", "))
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn resolve_app(name: &str) -> LaunchTarget {
    let trimmed = name.trim();
    let alias = match trimmed.to_lowercase().as_str() {
        "notepad" | "記事本" => "notepad",
        "calculator" | "計算機" => "calculator",
        "explorer" | "檔案總管" => "explorer",
        "cmd" | "terminal" | "終端機" => "terminal",
        "browser" | "瀏覽器" => return LaunchTarget::Url("https://www.google.com".to_string()),
        "spotify" => return LaunchTarget::Url("spotify:".to_string()),
        "discord" => return LaunchTarget::Url("discord:".to_string()),
        "vscode" | "code" => return LaunchTarget::Program("code".to_string()),
        _ => return LaunchTarget::Program(trimmed.to_string()),
    };
    LaunchTarget::Program(platform_program(alias).to_string())
}

#[cfg(target_os = "windows")]
fn platform_program(alias: &str) -> &'static str {
    match alias {
        "notepad" => "notepad.exe",
        "calculator" => "calc.exe",
        "explorer" => "explorer.exe",
        _ => "wt.exe",
    }
}

#[cfg(target_os = "macos")]
fn platform_program(alias: &str) -> &'static str {
    match alias {
        "notepad" => "TextEdit",
        "calculator" => "Calculator",
        "explorer" => "Finder",
        _ => "Terminal",
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_program(alias: &str) -> &'static str {
    match alias {
        "notepad" => "gedit",
        "calculator" => "gnome-calculator",
        "explorer" => "nautilus",
        _ => "x-terminal-emulator",
    }
}

fn shell_invocation(command: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "windows") {
        ("cmd", vec!["/C".to_string(), command.to_string()])
    } else {
        ("sh", vec!["-c".to_string(), command.to_string()])
    }
}

fn powershell(script: String) -> (&'static str, Vec<String>) {
    ("powershell", vec!["-NoProfile".to_string(), "-Command".to_string(), script])
}

fn applescript(script: String) -> (&'static str, Vec<String>) {
    ("osascript", vec!["-e".to_string(), script])
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_powershell(s: &str) -> String {
    s.replace('\'', "''")
}

#[async_trait]
impl Desktop for SystemDesktop {
    async fn launch_app(&self, name: &str) -> Result<String> {
        if name.trim().is_empty() {
            bail!("application name is empty");
        }
        match resolve_app(name) {
            LaunchTarget::Url(url) => open::that_detached(&url)?,
            LaunchTarget::Program(program) => {
                let mut cmd = if cfg!(target_os = "macos") {
                    let mut c = Command::new("open");
                    c.args(["-a", program.as_str()]);
                    c
                } else {
                    Command::new(&program)
                };
                cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
                cmd.spawn()
                    .with_context(|| format!("cannot launch {program}"))?;
            }
        }
        Ok(format!("Launched: {}", name.trim()))
    }

    async fn open_url(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| anyhow!("invalid URL {url}: {e}"))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => bail!("unsupported scheme '{scheme}' (only http/https)"),
        }
        open::that_detached(url)?;
        Ok(format!("Opened: {url}"))
    }

    async fn open_path(&self, path: &str) -> Result<String> {
        let target = PathBuf::from(shellexpand::tilde(path).into_owned());
        if !target.exists() {
            bail!("path not found: {path}");
        }
        open::that_detached(&target)?;
        Ok(format!("Opened: {path}"))
    }

    async fn run_command(&self, command: &str) -> Result<String> {
        let (program, args) = shell_invocation(command);
        self.run(program, &args, self.command_timeout)
            .await
            .map_err(|e| anyhow!("command failed: {e}"))
    }

    async fn clipboard_read(&self) -> Result<String> {
        tokio::task::spawn_blocking(|| -> Result<String> {
            let mut clipboard = arboard::Clipboard::new()?;
            Ok(clipboard.get_text()?)
        })
        .await?
    }

    async fn clipboard_write(&self, text: &str) -> Result<String> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)?;
            Ok(())
        })
        .await??;
        Ok("Copied to clipboard".to_string())
    }

    async fn system_info(&self) -> Result<SystemSnapshot> {
        tokio::task::spawn_blocking(|| {
            let mut system = System::new_all();
            system.refresh_all();

            SystemSnapshot {
                hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
                platform: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
                os_version: System::os_version().unwrap_or_default(),
                cpus: system.cpus().len(),
                total_memory: system.total_memory(),
                free_memory: system.available_memory(),
                uptime_secs: System::uptime(),
            }
        })
        .await
        .map_err(|e| anyhow!("system info failed: {e}"))
    }

    async fn create_document(&self, title: &str, content: &str) -> Result<String> {
        let date = chrono::Local::now().format("%Y-%m-%d").to_string();
        let body = render_document(title, &date, content);
        self.save_output(output_file_name(title, &Self::stamp(), "md"), body).await
    }

    async fn create_presentation(&self, title: &str, slides: &[Slide], theme: &str) -> Result<String> {
        let date = chrono::Local::now().format("%Y . %m . %d").to_string();
        let body = render_presentation(title, &date, slides, theme);
        self.save_output(output_file_name(title, &Self::stamp(), "slides.md"), body).await
    }

    async fn create_spreadsheet(&self, title: &str, rows: &[Vec<String>]) -> Result<String> {
        let body = render_spreadsheet(rows);
        self.save_output(output_file_name(title, &Self::stamp(), "csv"), body).await
    }

    async fn write_text_file(&self, name: &str, content: &str) -> Result<String> {
        // Only the final component is kept; writes never leave the workspace
        let file_name = Path::new(name)
            .file_name()
            .ok_or_else(|| anyhow!("invalid file name: {name}"))?;
        tokio::fs::create_dir_all(&self.workspace).await?;
        let path = self.workspace.join(file_name);
        tokio::fs::write(&path, content).await?;
        Ok(format!("Saved: {}", path.display()))
    }

    async fn read_text_file(&self, path: &str) -> Result<String> {
        let path = shellexpand::tilde(path).into_owned();
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("cannot read {path}"))?;
        Ok(String::from_utf8_lossy(&bytes).chars().take(MAX_READ_CHARS).collect())
    }

    async fn list_directory(&self, path: &str) -> Result<String> {
        let dir = if path.trim().is_empty() {
            self.workspace.clone()
        } else {
            PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
        };

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("cannot list {}", dir.display()))?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let meta = entry.metadata().await?;
            let line = if meta.is_dir() {
                format!("[DIR] {name}")
            } else {
                format!("{:>8} {name}", meta.len())
            };
            items.push((name, line));
        }
        items.sort();

        if items.is_empty() {
            return Ok("(empty)".to_string());
        }
        Ok(items
            .into_iter()
            .take(MAX_LIST_ENTRIES)
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn take_screenshot(&self) -> Result<String> {
        tokio::fs::create_dir_all(&self.workspace).await?;
        let path = self.workspace.join(format!("screenshot_{}.png", Self::stamp()));
        let target = path.to_string_lossy().to_string();

        let candidates = if cfg!(target_os = "macos") {
            vec![("screencapture", vec!["-x".to_string(), target.clone()])]
        } else if cfg!(target_os = "windows") {
            vec![powershell(format!(
                "Add-Type -AssemblyName System.Windows.Forms,System.Drawing; \
                 $b = [System.Windows.Forms.Screen]::PrimaryScreen.Bounds; \
                 $bmp = New-Object System.Drawing.Bitmap $b.Width, $b.Height; \
                 $g = [System.Drawing.Graphics]::FromImage($bmp); \
                 $g.CopyFromScreen($b.Location, [System.Drawing.Point]::Empty, $b.Size); \
                 $bmp.Save('{}')",
                escape_powershell(&target)
            ))]
        } else {
            vec![
                ("grim", vec![target.clone()]),
                ("gnome-screenshot", vec!["-f".to_string(), target.clone()]),
                ("scrot", vec![target.clone()]),
                ("import", vec!["-window".to_string(), "root".to_string(), target.clone()]),
            ]
        };

        self.run_first(candidates, self.script_timeout).await?;
        Ok(format!("Screenshot saved: {}", path.display()))
    }

    fn datetime(&self) -> DateTimeInfo {
        DateTimeInfo::from_datetime(&chrono::Local::now())
    }

    async fn search_web(&self, query: &str) -> Result<String> {
        let url = format!("https://www.google.com/search?q={}", urlencoding::encode(query));
        open::that_detached(&url)?;
        Ok(format!("Searched: {query}"))
    }

    async fn fetch_news(&self, query: &str, max_results: u8) -> Result<String> {
        let provider = self
            .news
            .as_ref()
            .ok_or_else(|| anyhow!("news search is not configured"))?;
        let max_results = if max_results == 0 { self.news_max_results } else { max_results };
        let query = news::clean_query(query);

        let items = provider
            .search(&query, max_results)
            .await
            .map_err(|e| anyhow!("search failed: {e}"))?;
        let items = news::dedup_results(items, max_results as usize);
        if items.is_empty() {
            bail!("no results found for \"{query}\"");
        }
        Ok(news::format_results(&items))
    }

    async fn kill_process(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            bail!("process name is empty");
        }
        let (program, args) = if cfg!(target_os = "windows") {
            ("taskkill", vec!["/f".to_string(), "/im".to_string(), name.to_string()])
        } else {
            ("pkill", vec!["-x".to_string(), name.to_string()])
        };
        let output = self
            .run(program, &args, self.script_timeout)
            .await
            .map_err(|e| anyhow!("cannot terminate {name}: {e}"))?;
        Ok(if output.is_empty() {
            format!("Terminated: {name}")
        } else {
            output
        })
    }

    async fn set_volume(&self, level: u8) -> Result<String> {
        if level > 100 {
            bail!("volume must be between 0 and 100, got {level}");
        }
        let candidates = if cfg!(target_os = "macos") {
            vec![applescript(format!("set volume output volume {level}"))]
        } else if cfg!(target_os = "windows") {
            // Mute-to-zero then step up; each key press is 2%
            vec![powershell(format!(
                "$w = New-Object -ComObject WScript.Shell; \
                 1..50 | ForEach-Object {{ $w.SendKeys([char]174) }}; \
                 1..{} | ForEach-Object {{ $w.SendKeys([char]175) }}",
                level / 2
            ))]
        } else {
            vec![
                ("wpctl", vec!["set-volume".to_string(), "@DEFAULT_AUDIO_SINK@".to_string(), format!("{level}%")]),
                ("pactl", vec!["set-sink-volume".to_string(), "@DEFAULT_SINK@".to_string(), format!("{level}%")]),
                ("amixer", vec!["-q".to_string(), "sset".to_string(), "Master".to_string(), format!("{level}%")]),
            ]
        };
        self.run_first(candidates, self.script_timeout).await?;
        Ok(format!("Volume set to {level}%"))
    }

    async fn show_notification(&self, title: &str, message: &str) -> Result<String> {
        let candidates = if cfg!(target_os = "macos") {
            vec![applescript(format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(message),
                escape_applescript(title)
            ))]
        } else if cfg!(target_os = "windows") {
            vec![powershell(format!(
                "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] > $null; \
                 $t = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); \
                 $n = $t.GetElementsByTagName('text'); \
                 $n.Item(0).AppendChild($t.CreateTextNode('{}')) > $null; \
                 $n.Item(1).AppendChild($t.CreateTextNode('{}')) > $null; \
                 [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('Desk Assistant').Show([Windows.UI.Notifications.ToastNotification]::new($t))",
                escape_powershell(title),
                escape_powershell(message)
            ))]
        } else {
            vec![("notify-send", vec![title.to_string(), message.to_string()])]
        };
        self.run_first(candidates, self.script_timeout).await?;
        Ok(format!("Notification sent: {title}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop(dir: &Path) -> SystemDesktop {
        SystemDesktop {
            workspace: dir.to_path_buf(),
            auto_open: false,
            command_timeout: Duration::from_secs(5),
            script_timeout: Duration::from_secs(5),
            news: None,
            news_max_results: 5,
        }
    }

    #[test]
    fn test_resolve_app_aliases() {
        assert_eq!(
            resolve_app("Browser"),
            LaunchTarget::Url("https://www.google.com".to_string())
        );
        assert_eq!(resolve_app("瀏覽器"), resolve_app("browser"));
        assert_eq!(resolve_app("vscode"), LaunchTarget::Program("code".to_string()));
        assert_eq!(resolve_app("記事本"), resolve_app("notepad"));
        assert_eq!(resolve_app(" gimp "), LaunchTarget::Program("gimp".to_string()));
    }

    #[test]
    fn test_new_creates_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.assistant.workspace = dir.path().join("out").to_string_lossy().to_string();
        let desktop = SystemDesktop::new(&config).unwrap();
        assert!(desktop.workspace.is_dir());
    }

    #[tokio::test]
    async fn test_write_read_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = desktop(dir.path());

        let msg = desktop.write_text_file("notes.txt", "hello").await.unwrap();
        assert!(msg.starts_with("Saved: "));

        let path = dir.path().join("notes.txt");
        let content = desktop.read_text_file(path.to_str().unwrap()).await.unwrap();
        assert_eq!(content, "hello");

        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let listing = desktop.list_directory("").await.unwrap();
        assert!(listing.contains("       5 notes.txt"));
        assert!(listing.contains("[DIR] sub"));
    }

    #[tokio::test]
    async fn test_write_text_file_stays_in_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = desktop(dir.path());
        desktop.write_text_file("../../escape.txt", "x").await.unwrap();
        assert!(dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_read_text_file_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        std::fs::write(&path, "a".repeat(MAX_READ_CHARS + 500)).unwrap();
        let content = desktop(dir.path())
            .read_text_file(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(content.chars().count(), MAX_READ_CHARS);
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = desktop(dir.path())
            .read_text_file("/nonexistent/file.txt")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(desktop(dir.path()).list_directory("").await.unwrap(), "(empty)");
    }

    #[tokio::test]
    async fn test_list_directory_caps_entries() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..60 {
            std::fs::write(dir.path().join(format!("f{i:02}.txt")), "").unwrap();
        }
        let listing = desktop(dir.path()).list_directory("").await.unwrap();
        assert_eq!(listing.lines().count(), MAX_LIST_ENTRIES);
    }

    #[tokio::test]
    async fn test_create_documents_in_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = desktop(dir.path());

        let msg = desktop.create_document("Weekly Report", "- done").await.unwrap();
        assert!(msg.starts_with("Created: "));
        assert!(msg.contains("Weekly_Report_"));

        let slides = vec![Slide { title: "One".into(), content: "x".into() }];
        let msg = desktop.create_presentation("Deck", &slides, "warm").await.unwrap();
        assert!(msg.ends_with(".slides.md"));

        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        let msg = desktop.create_spreadsheet("Data", &rows).await.unwrap();
        assert!(msg.ends_with(".csv"));

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_news_not_configured() {
        let dir = tempfile::tempdir().unwrap();
        let err = desktop(dir.path()).fetch_news("taiwan", 5).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_fetch_news_stalled_provider_fails_within_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/search", listener.local_addr().unwrap());
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let dir = tempfile::tempdir().unwrap();
        let mut desktop = desktop(dir.path());
        desktop.news = Some(Box::new(
            news::TavilyProvider::with_endpoint("k", &endpoint, Duration::from_secs(1)).unwrap(),
        ));
        let err = tokio::time::timeout(Duration::from_secs(10), desktop.fetch_news("taiwan", 3))
            .await
            .expect("fetch_news should be bounded by the provider timeout")
            .unwrap_err();
        assert!(err.to_string().starts_with("search failed: Tavily did not answer"), "got {err}");
    }

    #[tokio::test]
    async fn test_set_volume_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let err = desktop(dir.path()).set_volume(150).await.unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }

    #[tokio::test]
    async fn test_open_url_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = desktop(dir.path());
        assert!(desktop.open_url("not a url").await.is_err());
        let err = desktop.open_url("file:///etc/passwd").await.unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[tokio::test]
    async fn test_open_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = desktop(dir.path()).open_path("/nonexistent/x").await.unwrap_err();
        assert!(err.to_string().contains("path not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = desktop(dir.path());
        assert_eq!(desktop.run_command("echo hello").await.unwrap(), "hello");

        let err = desktop.run_command("echo oops >&2; exit 3").await.unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_command_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let mut desktop = desktop(dir.path());
        desktop.command_timeout = Duration::from_secs(1);
        let err = desktop.run_command("sleep 5").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_first_reports_missing_tools() {
        let dir = tempfile::tempdir().unwrap();
        let err = desktop(dir.path())
            .run_first(
                vec![("definitely-not-a-real-tool-xyz", vec![])],
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no suitable tool found"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_applescript(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_powershell("it's"), "it''s");
    }
}

//! OS-level capabilities the skills are built on.
//!
//! Every capability is an opaque external collaborator: it either
//! succeeds with a human-readable message or fails with a cause. The
//! dispatch layer turns both into a `SkillInvocationResult`.

pub mod documents;
pub mod news;
pub mod system;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use system::SystemDesktop;

/// One content slide of a generated presentation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Host facts reported by `system_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub hostname: String,
    pub platform: String,
    pub os_version: String,
    pub cpus: usize,
    /// Bytes
    pub total_memory: u64,
    /// Bytes
    pub free_memory: u64,
    pub uptime_secs: u64,
}

impl SystemSnapshot {
    pub fn total_memory_gb(&self) -> String {
        format_gb(self.total_memory)
    }

    pub fn free_memory_gb(&self) -> String {
        format_gb(self.free_memory)
    }

    /// Multi-line summary shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "System info\nHost: {}\nOS: {} {}\nCPU: {} cores\nMemory: {} free / {} total\nUptime: {}h {}m",
            self.hostname,
            self.platform,
            self.os_version,
            self.cpus,
            self.free_memory_gb(),
            self.total_memory_gb(),
            self.uptime_secs / 3600,
            (self.uptime_secs % 3600) / 60,
        )
    }
}

fn format_gb(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

/// Local date and time reported by `get_datetime`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTimeInfo {
    pub date: String,
    pub time: String,
    pub weekday: String,
    pub full: String,
}

impl DateTimeInfo {
    pub fn from_datetime<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            weekday: now.format("%A").to_string(),
            full: now.format("%A, %B %-d %Y %H:%M").to_string(),
        }
    }
}

/// The OS bridge. One method per capability in the skill menu.
#[async_trait]
pub trait Desktop: Send + Sync {
    async fn launch_app(&self, name: &str) -> Result<String>;
    async fn open_url(&self, url: &str) -> Result<String>;
    async fn open_path(&self, path: &str) -> Result<String>;
    async fn run_command(&self, command: &str) -> Result<String>;
    async fn clipboard_read(&self) -> Result<String>;
    async fn clipboard_write(&self, text: &str) -> Result<String>;
    async fn system_info(&self) -> Result<SystemSnapshot>;
    async fn create_document(&self, title: &str, content: &str) -> Result<String>;
    async fn create_presentation(&self, title: &str, slides: &[Slide], theme: &str) -> Result<String>;
    async fn create_spreadsheet(&self, title: &str, rows: &[Vec<String>]) -> Result<String>;
    async fn write_text_file(&self, name: &str, content: &str) -> Result<String>;
    async fn read_text_file(&self, path: &str) -> Result<String>;
    /// Empty `path` lists the workspace.
    async fn list_directory(&self, path: &str) -> Result<String>;
    async fn take_screenshot(&self) -> Result<String>;
    fn datetime(&self) -> DateTimeInfo;
    async fn search_web(&self, query: &str) -> Result<String>;
    async fn fetch_news(&self, query: &str, max_results: u8) -> Result<String>;
    async fn kill_process(&self, name: &str) -> Result<String>;
    async fn set_volume(&self, level: u8) -> Result<String>;
    async fn show_notification(&self, title: &str, message: &str) -> Result<String>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_info_format() {
        let dt = chrono::Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();
        let info = DateTimeInfo::from_datetime(&dt);
        assert_eq!(info.date, "2026-10-18");
        assert_eq!(info.time, "09:05:07");
        assert_eq!(info.weekday, "Sunday");
        assert_eq!(info.full, "Sunday, October 18 2026 09:05");
    }

    #[test]
    fn test_system_snapshot_summary() {
        let snap = SystemSnapshot {
            hostname: "box".into(),
            platform: "Linux".into(),
            os_version: "6.1".into(),
            cpus: 4,
            total_memory: 8 * 1024 * 1024 * 1024,
            free_memory: 2 * 1024 * 1024 * 1024 + 512 * 1024 * 1024,
            uptime_secs: 7260,
        };
        let summary = snap.summary();
        assert!(summary.contains("Host: box"));
        assert!(summary.contains("CPU: 4 cores"));
        assert!(summary.contains("2.5 GB free / 8.0 GB total"));
        assert!(summary.contains("Uptime: 2h 1m"));
    }

    #[test]
    fn test_slide_deserialization_tolerates_missing_fields() {
        let slides: Vec<Slide> =
            serde_json::from_str(r#"[{"title":"Intro"},{"content":"- a\n- b"}]"#).unwrap();
        assert_eq!(slides[0].title, "Intro");
        assert_eq!(slides[0].content, "");
        assert_eq!(slides[1].content, "- a\n- b");
    }
}

//! User settings: `apiUrl`, `tts`, `lang`.
//!
//! Settings are a flat string map persisted as JSON. The store is loaded
//! once and cached; callers take a [`Settings`] snapshot at the start of
//! each request instead of re-reading the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing::{debug, info, warn};

pub const KEY_API_URL: &str = "apiUrl";
pub const KEY_TTS: &str = "tts";
pub const KEY_LANG: &str = "lang";

const DEFAULT_LANG: &str = "zh-TW";

/// Typed view of the settings relevant to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the chat backend, without trailing `/`. Empty when unset.
    pub api_url: String,
    pub tts_enabled: bool,
    pub lang: String,
}

impl Settings {
    fn from_map(map: &BTreeMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).map(String::as_str).unwrap_or("");
        let lang = get(KEY_LANG);
        Self {
            api_url: normalize_api_url(get(KEY_API_URL)),
            tts_enabled: get(KEY_TTS) != "off",
            lang: if lang.is_empty() {
                DEFAULT_LANG.to_string()
            } else {
                lang.to_string()
            },
        }
    }
}

/// Trims whitespace and a single trailing `/`.
pub fn normalize_api_url(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Key-value settings provider injected into the assistant.
pub trait SettingsStore: Send + Sync {
    /// Returns the value for `key`, or an empty string when absent.
    fn get(&self, key: &str) -> String;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn snapshot(&self) -> Settings;

    /// Drops any cached values and re-reads the backing store.
    fn reload(&self) {}
}

/// Settings persisted to a JSON file.
pub struct JsonFileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileSettings {
    /// Opens the settings file. A missing or unreadable file yields empty settings.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = read_file(&path);
        info!("Settings loaded from {} ({} keys)", path.display(), values.len());
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn read_file(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return BTreeMap::new(),
    };
    // Non-string values are kept in their JSON text form
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
        Ok(map) => map
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect(),
        Err(e) => {
            warn!("Ignoring unreadable settings file {}: {e}", path.display());
            BTreeMap::new()
        }
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> String {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        let value = if key == KEY_API_URL {
            normalize_api_url(value)
        } else {
            value.to_string()
        };
        values.insert(key.to_string(), value);
        self.persist(&values)?;
        debug!("Setting saved: {key}");
        Ok(())
    }

    fn snapshot(&self) -> Settings {
        match self.values.lock() {
            Ok(values) => Settings::from_map(&values),
            Err(_) => Settings::from_map(&BTreeMap::new()),
        }
    }

    fn reload(&self) {
        let fresh = read_file(&self.path);
        info!("Settings reloaded from {} ({} keys)", self.path.display(), fresh.len());
        if let Ok(mut values) = self.values.lock() {
            *values = fresh;
        }
    }
}

/// In-memory settings, never persisted.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: Mutex::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> String {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn snapshot(&self) -> Settings {
        match self.values.lock() {
            Ok(values) => Settings::from_map(&values),
            Err(_) => Settings::from_map(&BTreeMap::new()),
        }
    }
}

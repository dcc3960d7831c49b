//! Configuration loading
//!
//! Reads %APPDATA%\AwesomeHands\config.json. A missing or corrupt file yields
//! the default configuration. Files written by older releases, which stored a
//! single `shortcut` map per application, are converted on load.

use crate::config::models::{AppConfig, EngineSettings, Settings, Shortcut, default_apps};
use crate::config::store::ensure_global;
use crate::error::{GestureError, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use tracing::{info, warn};

/// Accepted foreground polling interval range in milliseconds
const MONITORING_INTERVAL_RANGE_MS: (u64, u64) = (200, 5000);

/// Configuration manager
pub struct ConfigManager;

/// On-disk layout; every field is optional
///
/// Application entries stay raw JSON so one malformed entry is skipped
/// instead of failing the whole file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    apps: Option<Vec<serde_json::Value>>,
    engine: EngineSettings,
    monitoring_interval_ms: Option<u64>,
}

/// Legacy layout: `{ "shortcut": { "<keys>": ["<left>", "<right>"] } }`
///
/// Any entry without a `shortcuts` list is read this way.
#[derive(Debug, Deserialize)]
struct LegacyAppConfig {
    name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    shortcut: LegacyBindings,
}

/// Legacy bindings in file order; earlier keys win during resolution
#[derive(Debug, Default)]
struct LegacyBindings(Vec<(String, (String, String))>);

impl<'de> Deserialize<'de> for LegacyBindings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        deserializer.deserialize_map(LegacyBindingsVisitor)
    }
}

struct LegacyBindingsVisitor;

impl<'de> Visitor<'de> for LegacyBindingsVisitor {
    type Value = LegacyBindings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of key combinations to [left, right] gestures")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> StdResult<Self::Value, M::Error> {
        let mut bindings = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, (String, String)>()? {
            bindings.push(entry);
        }
        Ok(LegacyBindings(bindings))
    }
}

impl LegacyAppConfig {
    /// Convert to the current layout; entries without bindings are dropped
    fn upgrade(self) -> Option<AppConfig> {
        if self.shortcut.0.is_empty() {
            return None;
        }
        let shortcuts = self
            .shortcut
            .0
            .into_iter()
            .map(|(keys, (left, right))| {
                let side = |g: String| if g.is_empty() { None } else { Some(g) };
                Shortcut {
                    key_combination: keys,
                    gesture_left: side(left),
                    gesture_right: side(right),
                    enabled: true,
                    removable: true,
                }
            })
            .collect();
        Some(AppConfig {
            name: self.name,
            icon: self.icon,
            shortcuts,
        })
    }
}

/// Read one application entry in either layout, `None` if it is unusable
fn parse_app(entry: serde_json::Value) -> Option<AppConfig> {
    let label = entry
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();

    if entry.get("shortcuts").is_some() {
        return match serde_json::from_value::<AppConfig>(entry) {
            Ok(app) => Some(app),
            Err(e) => {
                warn!("Skipping invalid application entry '{}': {}", label, e);
                None
            }
        };
    }

    match serde_json::from_value::<LegacyAppConfig>(entry) {
        Ok(legacy) => {
            info!("Converting legacy configuration entry: {}", legacy.name);
            let upgraded = legacy.upgrade();
            if upgraded.is_none() {
                warn!("Dropping application entry '{}' without shortcuts", label);
            }
            upgraded
        }
        Err(e) => {
            warn!("Skipping invalid application entry '{}': {}", label, e);
            None
        }
    }
}

impl ConfigManager {
    /// Get the directory holding config.json and the logs
    ///
    /// Returns: %APPDATA%\AwesomeHands
    pub fn get_config_dir() -> PathBuf {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("AwesomeHands")
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.json")
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Settings> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from a file
    ///
    /// If the file doesn't exist or cannot be parsed, returns the default
    /// configuration. Invalid engine settings fall back to their defaults.
    pub fn load_from(path: &Path) -> Result<Settings> {
        if !path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(Settings::default());
        }

        let json = std::fs::read_to_string(path)?;
        match Self::parse(&json) {
            Ok(settings) => {
                info!(
                    "Configuration loaded successfully ({} application entries)",
                    settings.apps.len()
                );
                Ok(settings)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(Settings::default())
            }
        }
    }

    /// Parse configuration JSON and normalize it
    pub fn parse(json: &str) -> Result<Settings> {
        let file: ConfigFile = serde_json::from_str(json)?;

        let apps = match file.apps {
            Some(entries) => entries.into_iter().filter_map(parse_app).collect(),
            None => default_apps(),
        };

        let engine = match file.engine.validate() {
            Ok(()) => file.engine,
            Err(e) => {
                warn!("{}; using default engine settings", e);
                EngineSettings::default()
            }
        };

        let defaults = Settings::default();
        let monitoring_interval_ms = match file.monitoring_interval_ms {
            None => defaults.monitoring_interval_ms,
            Some(ms) => {
                let (min, max) = MONITORING_INTERVAL_RANGE_MS;
                let clamped = ms.clamp(min, max);
                if clamped != ms {
                    warn!("monitoringIntervalMs {} out of range, using {}", ms, clamped);
                }
                clamped
            }
        };

        Ok(Settings {
            apps: ensure_global(apps),
            engine,
            monitoring_interval_ms,
        })
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::get_config_dir();
        std::fs::create_dir_all(&dir).map_err(|e| GestureError::ConfigError(Box::new(e)))?;
        Ok(dir)
    }
}

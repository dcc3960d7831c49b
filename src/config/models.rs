//! Configuration data models
//!
//! This module defines the shortcut bindings and the tuning knobs of the
//! gesture engine. Field names serialize in camelCase so that existing
//! `config.json` files keep loading.

use crate::engine::GesturePair;
use crate::error::{GestureError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the reserved fallback entry
pub const GLOBAL_APP_NAME: &str = "Global";

/// Named control action: the left hand scrolls while pointing up
pub const MOUSE_SCROLL: &str = "Mouse Scroll";
/// Named control action: the right hand moves the cursor while pointing up
pub const MOUSE_CURSOR: &str = "Mouse Cursor";

/// Gesture label the classifier reports for an index finger pointing up
pub const POINTING_UP: &str = "Pointing_Up";

/// A gesture-to-action binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    /// Opaque action identifier, e.g. `control+c` or one of the named control actions
    pub key_combination: String,
    /// Required left hand gesture; unset means the left hand must show nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture_left: Option<String>,
    /// Required right hand gesture; unset means the right hand must show nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gesture_right: Option<String>,
    /// Disabled shortcuts are never resolved
    pub enabled: bool,
    /// Built-in shortcuts can be toggled but not removed
    pub removable: bool,
}

impl Shortcut {
    /// Create an enabled, removable shortcut
    pub fn new(
        key_combination: impl Into<String>,
        gesture_left: Option<&str>,
        gesture_right: Option<&str>,
    ) -> Self {
        Self {
            key_combination: key_combination.into(),
            gesture_left: gesture_left.map(str::to_string),
            gesture_right: gesture_right.map(str::to_string),
            enabled: true,
            removable: true,
        }
    }

    /// Left gesture label, empty when unset
    pub fn left_label(&self) -> &str {
        self.gesture_left.as_deref().unwrap_or("")
    }

    /// Right gesture label, empty when unset
    pub fn right_label(&self) -> &str {
        self.gesture_right.as_deref().unwrap_or("")
    }

    /// Whether at least one hand gesture is bound
    pub fn binds_gesture(&self) -> bool {
        !self.left_label().is_empty() || !self.right_label().is_empty()
    }

    /// Exact, case-sensitive match against a detected gesture pair
    ///
    /// An unset side only matches an empty detected side. A shortcut without
    /// any bound gesture never matches.
    pub fn matches(&self, pair: &GesturePair) -> bool {
        self.binds_gesture() && self.left_label() == pair.left && self.right_label() == pair.right
    }

    /// Whether both shortcuts bind the same gesture pair
    pub fn same_gestures(&self, other: &Shortcut) -> bool {
        self.left_label() == other.left_label() && self.right_label() == other.right_label()
    }

    /// Identity used by store edits: action plus gesture pair
    pub fn same_binding(&self, other: &Shortcut) -> bool {
        self.key_combination == other.key_combination && self.same_gestures(other)
    }
}

/// Shortcut bindings for one application, or the Global fallback entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Process name, or [`GLOBAL_APP_NAME`]
    pub name: String,
    /// Opaque icon blob (base64 image data) shown by the UI
    #[serde(default)]
    pub icon: String,
    /// Ordered bindings; earlier entries win
    pub shortcuts: Vec<Shortcut>,
}

impl AppConfig {
    /// Create an entry without shortcuts
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            shortcuts: Vec::new(),
        }
    }

    /// Whether this is the reserved Global entry
    pub fn is_global(&self) -> bool {
        self.name == GLOBAL_APP_NAME
    }
}

/// When a process-specific entry yields no match, should Global be searched?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlobalFallback {
    /// Fall back only if the process entry has no shortcuts at all.
    /// Any binding in the process entry silences Global for that process.
    #[default]
    WhenScopeEmpty,
    /// Fall back whenever the process entry produced no match
    Always,
}

/// Tuning knobs for gesture dispatch
///
/// Thresholds are empirical and depend on the camera and the hand landmark
/// model, so they live in configuration rather than in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    /// Gesture label that drives the pointer
    pub control_gesture: String,
    /// Landmark index of the fingertip that drives the pointer (8 = index tip)
    pub fingertip_landmark: usize,
    /// Per-axis jitter threshold in normalized frame units
    pub noise_threshold: f64,
    /// Normalized delta to screen pixels
    pub scale_factor: f64,
    /// A pointer baseline older than this is discarded
    pub pointer_idle_timeout_ms: u64,
    /// Minimum delay before the same action fires again while held
    pub trigger_cooldown_ms: u64,
    /// Precedence between process entries and Global
    pub global_fallback: GlobalFallback,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            control_gesture: POINTING_UP.to_string(),
            fingertip_landmark: 8,
            noise_threshold: 0.005,
            scale_factor: 4500.0,
            pointer_idle_timeout_ms: 1000,
            trigger_cooldown_ms: 1000,
            global_fallback: GlobalFallback::WhenScopeEmpty,
        }
    }
}

impl EngineSettings {
    /// Pointer baseline idle timeout
    pub fn pointer_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.pointer_idle_timeout_ms)
    }

    /// Repeat cooldown for a held gesture
    pub fn trigger_cooldown(&self) -> Duration {
        Duration::from_millis(self.trigger_cooldown_ms)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.control_gesture.trim().is_empty() {
            return Err(GestureError::InvalidSetting {
                name: "controlGesture",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.noise_threshold.is_finite() || self.noise_threshold < 0.0 {
            return Err(GestureError::InvalidSetting {
                name: "noiseThreshold",
                reason: format!("{} is not a non-negative number", self.noise_threshold),
            });
        }
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(GestureError::InvalidSetting {
                name: "scaleFactor",
                reason: format!("{} is not a positive number", self.scale_factor),
            });
        }
        Ok(())
    }
}

/// Everything loaded from config.json
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Application entries, Global included
    pub apps: Vec<AppConfig>,
    /// Engine tuning
    pub engine: EngineSettings,
    /// Foreground process polling interval in milliseconds (200-5000)
    pub monitoring_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apps: default_apps(),
            engine: EngineSettings::default(),
            monitoring_interval_ms: 1000,
        }
    }
}

/// Built-in pointer control bindings
///
/// They are not removable; the pointer itself is driven by the engine and
/// these entries only let the user see and disable the bindings.
pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut {
            key_combination: MOUSE_SCROLL.to_string(),
            gesture_left: Some(POINTING_UP.to_string()),
            gesture_right: None,
            enabled: true,
            removable: false,
        },
        Shortcut {
            key_combination: MOUSE_CURSOR.to_string(),
            gesture_left: None,
            gesture_right: Some(POINTING_UP.to_string()),
            enabled: true,
            removable: false,
        },
    ]
}

/// Configuration used on first start: a Global entry with the built-ins
pub fn default_apps() -> Vec<AppConfig> {
    vec![AppConfig {
        name: GLOBAL_APP_NAME.to_string(),
        icon: String::new(),
        shortcuts: default_shortcuts(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(left: &str, right: &str) -> GesturePair {
        GesturePair {
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.apps.len(), 1);
        assert!(settings.apps[0].is_global());
        assert_eq!(settings.monitoring_interval_ms, 1000);
        assert_eq!(settings.engine.trigger_cooldown(), Duration::from_secs(1));
        assert!(settings.engine.validate().is_ok());
    }

    #[test]
    fn test_unset_side_matches_only_empty() {
        let shortcut = Shortcut::new("A", Some("Open_Palm"), None);
        assert!(shortcut.matches(&pair("Open_Palm", "")));
        assert!(!shortcut.matches(&pair("Open_Palm", "Victory")));
        assert!(!shortcut.matches(&pair("open_palm", "")));
    }

    #[test]
    fn test_empty_string_side_is_unset() {
        let shortcut = Shortcut::new("A", Some(""), Some("Victory"));
        assert!(shortcut.matches(&pair("", "Victory")));
        assert!(shortcut.same_gestures(&Shortcut::new("B", None, Some("Victory"))));
    }

    #[test]
    fn test_shortcut_without_gesture_never_matches() {
        let shortcut = Shortcut::new("A", None, Some(""));
        assert!(!shortcut.binds_gesture());
        assert!(!shortcut.matches(&pair("", "")));
    }

    #[test]
    fn test_shortcut_json_field_names() {
        let json = r#"{"keyCombination":"control+c","gestureLeft":"Victory","enabled":true,"removable":true}"#;
        let shortcut: Shortcut = serde_json::from_str(json).unwrap();
        assert_eq!(shortcut.key_combination, "control+c");
        assert_eq!(shortcut.left_label(), "Victory");
        assert_eq!(shortcut.right_label(), "");
    }

    #[test]
    fn test_partial_engine_settings_use_defaults() {
        let engine: EngineSettings = serde_json::from_str(r#"{"scaleFactor": 4000.0}"#).unwrap();
        assert!((engine.scale_factor - 4000.0).abs() < f64::EPSILON);
        assert_eq!(engine.control_gesture, POINTING_UP);
        assert_eq!(engine.global_fallback, GlobalFallback::WhenScopeEmpty);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut engine = EngineSettings {
            scale_factor: 0.0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            engine.validate(),
            Err(GestureError::InvalidSetting { name: "scaleFactor", .. })
        ));

        engine.scale_factor = 4500.0;
        engine.noise_threshold = f64::NAN;
        assert!(engine.validate().is_err());

        engine.noise_threshold = 0.005;
        engine.control_gesture = "  ".to_string();
        assert!(engine.validate().is_err());
    }
}

//! Error types for Awesome Hands
//!
//! Errors only exist at the edges of the application: loading configuration,
//! editing the shortcut store and probing the foreground process. The
//! per-frame dispatch path never returns an error; unmatched or ambiguous input
//! simply produces no action.
//!
//! Error variants use `#[source]` to preserve error chains.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for Awesome Hands
#[derive(Debug, Error)]
pub enum GestureError {
    /// Foreground process monitoring error
    #[error("Process monitoring error: {0}")]
    ProcessMonitorError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An engine setting is outside its accepted range
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting {
        /// Setting name as it appears in config.json
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// No application entry with the given name
    #[error("Application not found: {0}")]
    AppNotFound(String),

    /// An application entry with the given name already exists
    #[error("Application already configured: {0}")]
    DuplicateApp(String),

    /// The reserved Global entry cannot be removed
    #[error("The '{0}' entry cannot be removed")]
    ProtectedApp(String),

    /// Shortcut has neither a left nor a right gesture
    #[error("Shortcut '{0}' must bind at least one hand gesture")]
    EmptyGestureBinding(String),

    /// Another shortcut in the same application already uses this gesture pair
    #[error("Gesture pair ({left}, {right}) is already bound in '{app}'")]
    DuplicateGesturePair {
        /// Application entry name
        app: String,
        /// Left hand gesture label (empty when unset)
        left: String,
        /// Right hand gesture label (empty when unset)
        right: String,
    },

    /// No matching shortcut in the application entry
    #[error("Shortcut '{key_combination}' not found in '{app}'")]
    ShortcutNotFound {
        /// Application entry name
        app: String,
        /// Shortcut action identifier
        key_combination: String,
    },

    /// Built-in shortcuts cannot be deleted, only disabled
    #[error("Shortcut '{0}' is built in and cannot be removed")]
    ShortcutNotRemovable(String),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApiError(#[from] windows::core::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for Awesome Hands operations
pub type Result<T> = std::result::Result<T, GestureError>;

/// Convert an error to a message suitable for showing to end users
pub fn get_user_friendly_error(error: &GestureError) -> String {
    match error {
        GestureError::ProcessMonitorError(_) => "Failed to detect the active application.\n\n\
             Only Global shortcuts will be used until detection recovers."
            .to_string(),
        GestureError::ConfigError(_) | GestureError::InvalidSetting { .. } => {
            format!(
                "Failed to load configuration:\n\n{error}\n\n\
                 Default settings will be used."
            )
        }
        GestureError::AppNotFound(name) => {
            format!("No shortcuts are configured for '{name}'.")
        }
        GestureError::DuplicateApp(name) => {
            format!("'{name}' is already in the application list.")
        }
        GestureError::ProtectedApp(name) => {
            format!("The '{name}' entry holds the fallback shortcuts and cannot be removed.")
        }
        GestureError::EmptyGestureBinding(keys) => {
            format!("Choose a left or right hand gesture for '{keys}'.")
        }
        GestureError::DuplicateGesturePair { app, left, right } => {
            let describe = |g: &str| if g.is_empty() { "none".to_string() } else { g.to_string() };
            format!(
                "The gesture combination (left: {}, right: {}) is already used in '{app}'.\n\n\
                 Pick a different combination or remove the existing shortcut first.",
                describe(left),
                describe(right)
            )
        }
        GestureError::ShortcutNotFound { app, key_combination } => {
            format!("Shortcut '{key_combination}' no longer exists in '{app}'.")
        }
        GestureError::ShortcutNotRemovable(keys) => {
            format!("'{keys}' is a built-in shortcut. It can be disabled but not removed.")
        }
        #[cfg(windows)]
        GestureError::WindowsApiError(e) => {
            format!(
                "A Windows API error occurred:\n\n{e}\n\n\
                 Please ensure your Windows installation is up to date."
            )
        }
        GestureError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        GestureError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}

//! Configuration module
//!
//! Holds the gesture-to-action bindings and the engine tuning knobs.
//! `ConfigManager` loads %APPDATA%\AwesomeHands\config.json (including the
//! legacy single-map format) and `ConfigStore` serves snapshots of the
//! bindings to the engine while the UI edits them.

pub mod manager;
pub mod models;
pub mod store;

pub use manager::ConfigManager;
pub use models::{AppConfig, EngineSettings, GlobalFallback, Settings, Shortcut};
pub use store::ConfigStore;

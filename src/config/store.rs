//! In-memory shortcut store
//!
//! Holds the current list of application entries behind a lock and hands out
//! immutable snapshots. Every edit builds a new list and swaps it in, so a frame
//! that already holds a snapshot keeps a consistent view while the UI edits.

use crate::config::models::{AppConfig, GLOBAL_APP_NAME, Shortcut, default_shortcuts};
use crate::error::{GestureError, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to the application entries
///
/// Cloning is cheap and all clones see the same data.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    apps: Arc<RwLock<Arc<[AppConfig]>>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ConfigStore {
    /// Create a store, guaranteeing the Global entry and its built-in shortcuts
    pub fn new(apps: Vec<AppConfig>) -> Self {
        Self {
            apps: Arc::new(RwLock::new(ensure_global(apps).into())),
        }
    }

    /// Latest snapshot of all entries
    pub fn snapshot(&self) -> Arc<[AppConfig]> {
        Arc::clone(&self.apps.read())
    }

    /// Replace every entry, e.g. after the configuration was reloaded
    pub fn replace(&self, apps: Vec<AppConfig>) {
        let apps = ensure_global(apps);
        info!("Shortcut store replaced with {} application entries", apps.len());
        *self.apps.write() = apps.into();
    }

    /// Add an application entry without shortcuts
    pub fn add_app(&self, name: &str, icon: &str) -> Result<()> {
        self.edit(|apps| {
            if apps.iter().any(|app| app.name == name) {
                return Err(GestureError::DuplicateApp(name.to_string()));
            }
            apps.push(AppConfig::new(name, icon));
            info!("Added application entry: {}", name);
            Ok(())
        })
    }

    /// Remove an application entry; Global is protected
    pub fn remove_app(&self, name: &str) -> Result<()> {
        if name == GLOBAL_APP_NAME {
            return Err(GestureError::ProtectedApp(name.to_string()));
        }
        self.edit(|apps| {
            let before = apps.len();
            apps.retain(|app| app.name != name);
            if apps.len() == before {
                return Err(GestureError::AppNotFound(name.to_string()));
            }
            info!("Removed application entry: {}", name);
            Ok(())
        })
    }

    /// Append a shortcut to an application entry
    ///
    /// Rejects shortcuts without any gesture and gesture pairs that are already
    /// bound in the same entry.
    pub fn add_shortcut(&self, app_name: &str, shortcut: Shortcut) -> Result<()> {
        if !shortcut.binds_gesture() {
            return Err(GestureError::EmptyGestureBinding(shortcut.key_combination));
        }
        self.edit(|apps| {
            let app = find_app_mut(apps, app_name)?;
            if app.shortcuts.iter().any(|s| s.same_gestures(&shortcut)) {
                return Err(GestureError::DuplicateGesturePair {
                    app: app_name.to_string(),
                    left: shortcut.left_label().to_string(),
                    right: shortcut.right_label().to_string(),
                });
            }
            info!(
                "Bound '{}' to ({}, {}) in {}",
                shortcut.key_combination,
                shortcut.left_label(),
                shortcut.right_label(),
                app_name
            );
            app.shortcuts.push(shortcut);
            Ok(())
        })
    }

    /// Remove a shortcut identified by action and gesture pair
    pub fn remove_shortcut(&self, app_name: &str, shortcut: &Shortcut) -> Result<()> {
        self.edit(|apps| {
            let app = find_app_mut(apps, app_name)?;
            let index = position_of(app, shortcut)?;
            if !app.shortcuts[index].removable {
                return Err(GestureError::ShortcutNotRemovable(
                    shortcut.key_combination.clone(),
                ));
            }
            app.shortcuts.remove(index);
            info!("Removed shortcut '{}' from {}", shortcut.key_combination, app_name);
            Ok(())
        })
    }

    /// Flip the enabled flag of a shortcut and return the new state
    pub fn toggle_shortcut(&self, app_name: &str, shortcut: &Shortcut) -> Result<bool> {
        self.edit(|apps| {
            let app = find_app_mut(apps, app_name)?;
            let index = position_of(app, shortcut)?;
            let target = &mut app.shortcuts[index];
            target.enabled = !target.enabled;
            info!(
                "Shortcut '{}' in {} is now {}",
                target.key_combination,
                app_name,
                if target.enabled { "enabled" } else { "disabled" }
            );
            Ok(target.enabled)
        })
    }

    /// Apply an edit to a copy of the entries and publish it on success
    fn edit<T>(&self, f: impl FnOnce(&mut Vec<AppConfig>) -> Result<T>) -> Result<T> {
        let mut guard = self.apps.write();
        let mut apps = guard.to_vec();
        let value = f(&mut apps)?;
        *guard = apps.into();
        debug!("Published new shortcut snapshot ({} entries)", guard.len());
        Ok(value)
    }
}

fn find_app_mut<'a>(apps: &'a mut [AppConfig], name: &str) -> Result<&'a mut AppConfig> {
    apps.iter_mut()
        .find(|app| app.name == name)
        .ok_or_else(|| GestureError::AppNotFound(name.to_string()))
}

fn position_of(app: &AppConfig, shortcut: &Shortcut) -> Result<usize> {
    app.shortcuts
        .iter()
        .position(|s| s.same_binding(shortcut))
        .ok_or_else(|| GestureError::ShortcutNotFound {
            app: app.name.clone(),
            key_combination: shortcut.key_combination.clone(),
        })
}

/// Make sure a Global entry exists and carries the built-in shortcuts
///
/// Built-ins missing from Global (matched by action name) are inserted at the
/// front, in their default order.
pub fn ensure_global(mut apps: Vec<AppConfig>) -> Vec<AppConfig> {
    let index = if let Some(index) = apps.iter().position(AppConfig::is_global) {
        index
    } else {
        info!("No Global entry configured, creating one");
        apps.push(AppConfig::new(GLOBAL_APP_NAME, ""));
        apps.len() - 1
    };

    let global = &mut apps[index];
    let missing: Vec<Shortcut> = default_shortcuts()
        .into_iter()
        .filter(|builtin| {
            !global
                .shortcuts
                .iter()
                .any(|s| s.key_combination == builtin.key_combination)
        })
        .collect();
    if !missing.is_empty() {
        debug!("Restoring {} built-in Global shortcuts", missing.len());
        let mut shortcuts = missing;
        shortcuts.append(&mut global.shortcuts);
        global.shortcuts = shortcuts;
    }
    apps
}

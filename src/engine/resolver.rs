//! Shortcut resolution
//!
//! Finds the binding for a gesture pair. The entry named after the foreground
//! process is searched first; the Global entry is the fallback scope. A missing
//! Global entry simply means no fallback.

use crate::config::models::{AppConfig, GLOBAL_APP_NAME, GlobalFallback, Shortcut};
use crate::engine::tracker::GesturePair;
use tracing::debug;

/// Resolve the enabled shortcut bound to `pair` for the active process
///
/// Precedence is strict: a match in the process entry always wins over Global,
/// with no merging. Whether Global is consulted after the process entry yields
/// nothing is decided by `fallback`.
pub fn resolve<'a>(
    pair: &GesturePair,
    active_process: &str,
    apps: &'a [AppConfig],
    fallback: GlobalFallback,
) -> Option<&'a Shortcut> {
    if pair.is_empty() {
        return None;
    }

    let scoped = apps.iter().find(|app| app.name == active_process);
    if let Some(app) = scoped {
        if let Some(shortcut) = find_in(app, pair) {
            return Some(shortcut);
        }
        let fall_through = match fallback {
            GlobalFallback::Always => true,
            GlobalFallback::WhenScopeEmpty => app.shortcuts.is_empty(),
        };
        if !fall_through || app.is_global() {
            debug!(
                "No binding for ({}, {}) in {}, Global silenced",
                pair.left, pair.right, app.name
            );
            return None;
        }
    }

    apps.iter()
        .find(|app| app.name == GLOBAL_APP_NAME)
        .and_then(|global| find_in(global, pair))
}

/// First enabled shortcut of `app` matching `pair`, in list order
fn find_in<'a>(app: &'a AppConfig, pair: &GesturePair) -> Option<&'a Shortcut> {
    app.shortcuts
        .iter()
        .find(|shortcut| shortcut.enabled && shortcut.matches(pair))
}

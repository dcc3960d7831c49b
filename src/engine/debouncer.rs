//! Trigger debouncing
//!
//! Classifier output arrives many times per second, so a held gesture resolves
//! to the same shortcut on every frame. The debouncer turns that into at most
//! one fire per cooldown for a held action, while a different action fires
//! immediately.

use crate::config::models::Shortcut;
use std::time::{Duration, Instant};
use tracing::debug;

/// The last action fired in the current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerState {
    last_fired: Option<(String, Instant)>,
}

impl TriggerState {
    /// Action identifier of the last fire, if any
    pub fn last_fired_action(&self) -> Option<&str> {
        self.last_fired.as_ref().map(|(action, _)| action.as_str())
    }

    /// Time of the last fire, if any
    pub fn last_fired_at(&self) -> Option<Instant> {
        self.last_fired.as_ref().map(|(_, at)| *at)
    }

    /// Forget the last fire
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

/// Decides whether a resolved shortcut fires on this frame
#[derive(Debug, Clone)]
pub struct TriggerDebouncer {
    cooldown: Duration,
    state: TriggerState,
}

impl TriggerDebouncer {
    /// Create a debouncer with the given repeat cooldown
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: TriggerState::default(),
        }
    }

    /// Current state, for inspection
    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    /// Forget the last fire (session start/stop)
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Whether `resolved` fires at `now`; records the fire if so
    ///
    /// Losing the gesture (`None`) leaves the state alone, so quickly
    /// re-presenting the same gesture is still subject to the cooldown.
    pub fn should_fire(&mut self, resolved: Option<&Shortcut>, now: Instant) -> bool {
        let Some(shortcut) = resolved else {
            return false;
        };
        let action = shortcut.key_combination.as_str();

        let fire = match &self.state.last_fired {
            None => true,
            Some((last_action, _)) if last_action != action => true,
            Some((_, last_at)) => now.saturating_duration_since(*last_at) >= self.cooldown,
        };

        if fire {
            self.state.last_fired = Some((action.to_string(), now));
        } else {
            debug!("Debounced repeat of '{}'", action);
        }
        fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(1000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_resolution_fires() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let a = Shortcut::new("A", Some("Open_Palm"), None);
        let now = Instant::now();

        assert!(debouncer.should_fire(Some(&a), now));
        assert_eq!(debouncer.state().last_fired_action(), Some("A"));
        assert_eq!(debouncer.state().last_fired_at(), Some(now));
    }

    #[test]
    fn test_none_does_not_fire_or_reset() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let a = Shortcut::new("A", Some("Open_Palm"), None);
        let start = Instant::now();

        assert!(debouncer.should_fire(Some(&a), start));
        assert!(!debouncer.should_fire(None, start + ms(100)));
        assert_eq!(debouncer.state().last_fired_action(), Some("A"));

        // Re-acquiring the same gesture is still in cooldown
        assert!(!debouncer.should_fire(Some(&a), start + ms(200)));
    }

    #[test]
    fn test_held_gesture_repeats_after_cooldown() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let a = Shortcut::new("A", Some("Open_Palm"), None);
        let start = Instant::now();

        assert!(debouncer.should_fire(Some(&a), start));
        assert!(!debouncer.should_fire(Some(&a), start + ms(33)));
        assert!(!debouncer.should_fire(Some(&a), start + ms(999)));
        assert!(debouncer.should_fire(Some(&a), start + ms(1000)));
        assert!(!debouncer.should_fire(Some(&a), start + ms(1500)));
        assert!(debouncer.should_fire(Some(&a), start + ms(2100)));
    }

    #[test]
    fn test_different_action_fires_immediately() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let a = Shortcut::new("A", Some("Open_Palm"), None);
        let b = Shortcut::new("B", Some("Victory"), None);
        let start = Instant::now();

        assert!(debouncer.should_fire(Some(&a), start));
        assert!(debouncer.should_fire(Some(&b), start + ms(10)));
        assert!(debouncer.should_fire(Some(&a), start + ms(20)));
        assert_eq!(debouncer.state().last_fired_action(), Some("A"));
    }

    #[test]
    fn test_same_action_from_other_gesture_is_debounced() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let palm = Shortcut::new("A", Some("Open_Palm"), None);
        let victory = Shortcut::new("A", Some("Victory"), None);
        let start = Instant::now();

        assert!(debouncer.should_fire(Some(&palm), start));
        assert!(!debouncer.should_fire(Some(&victory), start + ms(100)));
    }

    #[test]
    fn test_reset_clears_cooldown() {
        let mut debouncer = TriggerDebouncer::new(COOLDOWN);
        let a = Shortcut::new("A", Some("Open_Palm"), None);
        let start = Instant::now();

        assert!(debouncer.should_fire(Some(&a), start));
        debouncer.reset();
        assert_eq!(debouncer.state(), &TriggerState::default());
        assert!(debouncer.should_fire(Some(&a), start + ms(10)));
    }
}

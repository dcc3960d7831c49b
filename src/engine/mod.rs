//! Gesture dispatch engine
//!
//! Turns the per-frame classifier stream into discrete action requests.
//!
//! # Frame pipeline
//!
//! ```text
//! GestureFrame ─→ track ─→ resolve ─→ TriggerDebouncer ─→ Actuator::on_shortcut_fire
//!             └─→ control_hands ─→ PointerController ─→ Actuator::on_pointer_move
//! ```
//!
//! Both branches run on every frame and may both produce an action.
//!
//! # Sessions
//!
//! The engine is `Idle` until a camera session starts. Starting and stopping a
//! session clears the debounce state and the pointer baseline, so every session
//! starts cold. Frames arriving while idle are ignored.
//!
//! # Shared inputs
//!
//! The shortcut snapshot and the foreground process name are read once per
//! frame from handles that other threads update. The process name may be up to
//! one polling interval stale.

pub mod debouncer;
pub mod pointer;
pub mod resolver;
pub mod tracker;

pub use debouncer::{TriggerDebouncer, TriggerState};
pub use pointer::{
    ControlHand, Point, PointerBaseline, PointerController, PointerDelta, PointerMotion,
    PointerSettings,
};
pub use resolver::resolve;
pub use tracker::{GestureFrame, GesturePair, HandResult, Handedness, Landmark, track};

use crate::actuator::Actuator;
use crate::config::{ConfigStore, EngineSettings};
use crate::monitor::ForegroundProcess;
use serde::Deserialize;
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Camera session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No camera running
    Idle,
    /// Camera running, frames arriving
    Active,
}

/// Input of the engine event loop
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// Camera opened
    SessionStart,
    /// Classifier output for one frame
    Frame(GestureFrame),
    /// Camera closed
    SessionStop,
}

/// Capacity of the bounded queue feeding [`GestureEngine::run`]
pub const EVENT_QUEUE_CAPACITY: usize = 32;

/// Outcome of [`offer_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The event is in the queue
    Queued,
    /// The queue was full and the frame was discarded
    Dropped,
    /// The engine is gone
    Disconnected,
}

/// Hand an event to a bounded engine queue
///
/// Frames never wait: when the queue is full they are dropped, so a slow
/// consumer works on recent frames instead of a backlog that gets stamped
/// long after capture. Session events block until there is room.
pub fn offer_event(sender: &mpsc::SyncSender<EngineEvent>, event: EngineEvent) -> Delivery {
    if matches!(event, EngineEvent::Frame(_)) {
        return match sender.try_send(event) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::TrySendError::Full(_)) => Delivery::Dropped,
            Err(mpsc::TrySendError::Disconnected(_)) => Delivery::Disconnected,
        };
    }
    match sender.send(event) {
        Ok(()) => Delivery::Queued,
        Err(mpsc::SendError(_)) => Delivery::Disconnected,
    }
}

/// Actions produced by one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameActions {
    /// Action identifier fired this frame
    pub fired: Option<String>,
    /// Pointer motion emitted this frame
    pub motion: Option<PointerMotion>,
}

/// Gesture dispatch engine for one camera at a time
pub struct GestureEngine<A: Actuator> {
    config: ConfigStore,
    foreground: ForegroundProcess,
    settings: EngineSettings,
    actuator: A,
    session: SessionState,
    debouncer: TriggerDebouncer,
    pointer: PointerController,
}

impl<A: Actuator> GestureEngine<A> {
    /// Create an idle engine
    pub fn new(
        config: ConfigStore,
        foreground: ForegroundProcess,
        settings: EngineSettings,
        actuator: A,
    ) -> Self {
        Self {
            debouncer: TriggerDebouncer::new(settings.trigger_cooldown()),
            pointer: PointerController::new(PointerSettings::from(&settings)),
            config,
            foreground,
            settings,
            actuator,
            session: SessionState::Idle,
        }
    }

    /// Current session state
    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Engine tuning in effect
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Debounce state, for inspection
    pub fn trigger_state(&self) -> &TriggerState {
        self.debouncer.state()
    }

    /// Pointer baseline, for inspection
    pub fn pointer_baseline(&self) -> Option<&PointerBaseline> {
        self.pointer.baseline()
    }

    /// The actuator receiving action requests
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Recalibrate; clears session state
    pub fn update_settings(&mut self, settings: EngineSettings) {
        info!("Engine settings updated: {:?}", settings);
        self.debouncer = TriggerDebouncer::new(settings.trigger_cooldown());
        self.pointer = PointerController::new(PointerSettings::from(&settings));
        self.settings = settings;
    }

    /// Camera opened
    pub fn start_session(&mut self) {
        info!("Gesture session started");
        self.clear_session_state();
        self.session = SessionState::Active;
    }

    /// Camera closed
    pub fn stop_session(&mut self) {
        info!("Gesture session stopped");
        self.clear_session_state();
        self.session = SessionState::Idle;
    }

    fn clear_session_state(&mut self) {
        self.debouncer.reset();
        self.pointer.reset();
    }

    /// Run one frame through the pipeline and dispatch the resulting actions
    pub fn process_frame(&mut self, frame: &GestureFrame, now: Instant) -> FrameActions {
        if self.session == SessionState::Idle {
            trace!("Frame received while idle, ignored");
            return FrameActions::default();
        }

        let pair = track(frame);
        let apps = self.config.snapshot();
        let process = self.foreground.current();
        let resolved = resolve(&pair, &process, &apps, self.settings.global_fallback);

        let fired = if self.debouncer.should_fire(resolved, now) {
            resolved.map(|shortcut| shortcut.key_combination.clone())
        } else {
            None
        };

        let hands = pointer::control_hands(
            frame,
            &self.settings.control_gesture,
            self.settings.fingertip_landmark,
        );
        let motion = self.pointer.update(&hands, now);

        if let Some(action) = &fired {
            debug!(
                "({}, {}) in '{}' fired '{}'",
                pair.left, pair.right, process, action
            );
            self.actuator.on_shortcut_fire(action);
        }
        if let Some(motion) = motion {
            self.actuator.on_pointer_move(motion.delta, motion.is_left_hand);
        }

        FrameActions { fired, motion }
    }

    /// Apply one event, stamping frames with the current time
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::SessionStart => self.start_session(),
            EngineEvent::Frame(frame) => {
                self.process_frame(&frame, Instant::now());
            }
            EngineEvent::SessionStop => self.stop_session(),
        }
    }

    /// Consume events until every sender is gone
    ///
    /// The channel serializes producers, so the session state is only ever
    /// touched from this thread.
    pub fn run(&mut self, receiver: &mpsc::Receiver<EngineEvent>) {
        info!("Entering gesture event loop");
        loop {
            match receiver.recv() {
                Ok(event) => self.handle_event(event),
                Err(mpsc::RecvError) => {
                    warn!("Engine event channel disconnected. Exiting event loop.");
                    break;
                }
            }
        }
        if self.session == SessionState::Active {
            self.stop_session();
        }
        info!("Gesture event loop exited");
    }
}

//! Action dispatch seam
//!
//! The engine emits two kinds of requests: fire a shortcut, and move the
//! pointer. How they reach the OS is up to the [`Actuator`] implementation.
//! Two implementations ship with the crate: one that only logs, and one that
//! writes each request as a JSON line for an external injector process.

use crate::engine::pointer::PointerDelta;
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

/// Receiver of the engine's action requests
pub trait Actuator {
    /// Fire the action bound to a gesture
    fn on_shortcut_fire(&mut self, key_combination: &str);

    /// Move the pointer; the left hand scrolls, the right hand moves the cursor
    fn on_pointer_move(&mut self, delta: PointerDelta, is_left_hand: bool);
}

/// Serialized form of an action request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionRequest<'a> {
    /// A shortcut fired
    #[serde(rename_all = "camelCase")]
    Fire {
        /// Action identifier
        key_combination: &'a str,
    },
    /// Relative pointer motion
    #[serde(rename_all = "camelCase")]
    Move {
        /// Horizontal motion in pixels
        x: f64,
        /// Vertical motion in pixels
        y: f64,
        /// Left hand drives scrolling
        is_left_hand: bool,
    },
}

/// Actuator that only records requests in the log
#[derive(Debug, Default)]
pub struct LoggingActuator;

impl Actuator for LoggingActuator {
    fn on_shortcut_fire(&mut self, key_combination: &str) {
        info!("Shortcut fired: {}", key_combination);
    }

    fn on_pointer_move(&mut self, delta: PointerDelta, is_left_hand: bool) {
        info!(
            "Pointer {} by ({:.1}, {:.1})",
            if is_left_hand { "scroll" } else { "move" },
            delta.x,
            delta.y
        );
    }
}

/// Actuator writing one JSON object per request
///
/// Write failures are logged and the request is dropped.
pub struct JsonLinesActuator<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesActuator<W> {
    /// Wrap a writer, e.g. stdout
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, request: &ActionRequest<'_>) {
        let writer = &mut self.writer;
        let result = serde_json::to_writer(&mut *writer, request)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = result {
            warn!("Failed to write action request {:?}: {}", request, e);
        }
    }
}

impl<W: Write> Actuator for JsonLinesActuator<W> {
    fn on_shortcut_fire(&mut self, key_combination: &str) {
        self.emit(&ActionRequest::Fire { key_combination });
    }

    fn on_pointer_move(&mut self, delta: PointerDelta, is_left_hand: bool) {
        self.emit(&ActionRequest::Move {
            x: delta.x,
            y: delta.y,
            is_left_hand,
        });
    }
}

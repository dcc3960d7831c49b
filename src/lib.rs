//! Awesome Hands - hand gesture shortcut dispatch
//!
//! Consumes per-frame hand gesture classifications and turns them into
//! keyboard shortcut fires and pointer motion. Shortcuts are scoped to the
//! foreground application with a Global fallback. A `ProcessMonitor` thread
//! tracks the foreground process while `GestureEngine` runs the per-frame
//! pipeline and hands results to an `Actuator`.
//!
//! # Performance
//!
//! The frame pipeline performs no I/O and reads shared state through
//! `parking_lot` read locks only, so it keeps up with a 30 fps camera easily.

pub mod actuator;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use error::{GestureError, Result};

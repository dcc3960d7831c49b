//! Foreground process monitoring
//!
//! Shortcuts are scoped to the application the user is looking at. This
//! module keeps a shared [`ForegroundProcess`] cell up to date by polling the
//! OS from a background thread.
//!
//! # Architecture
//!
//! - [`ForegroundProbe`]: one query for the foreground process path. The
//!   Windows probe asks `GetForegroundWindow` for the owning process and reads
//!   its image name; other platforms report an error on every poll.
//! - [`ProcessMonitor`]: turns the probe's path into a file stem and writes it
//!   to the cell when it changes.
//! - [`MonitorHandle`]: stops the polling thread.
//!
//! # Example Usage
//!
//! ```no_run
//! use awesome_hands::monitor::{ForegroundProcess, ProcessMonitor, platform_probe};
//! use std::time::Duration;
//!
//! let foreground = ForegroundProcess::default();
//! let handle = ProcessMonitor::new(
//!     platform_probe(),
//!     foreground.clone(),
//!     Duration::from_millis(1000),
//! )
//! .start();
//!
//! println!("Foreground: {}", foreground.current());
//! handle.stop();
//! ```

pub mod process_monitor;

pub use process_monitor::{
    ForegroundProbe, ForegroundProcess, MonitorHandle, ProcessMonitor, platform_probe,
};

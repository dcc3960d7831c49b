//! Foreground process monitoring
//!
//! Polls the name of the process owning the foreground window and publishes it
//! to a shared cell. The gesture engine reads the cell on every frame without
//! waiting on the monitor, so the value may be up to one interval stale.
//!
//! Names are the executable file stem as reported by the OS (`notepad.exe` ->
//! `notepad`). Case is preserved because shortcut scopes match exactly.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[cfg(windows)]
use windows::Win32::Foundation::{CloseHandle, HANDLE};
#[cfg(windows)]
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowThreadProcessId};
#[cfg(windows)]
use windows::core::PWSTR;

use crate::error::Result;
#[cfg(not(windows))]
use crate::error::{GestureError, StringError};

/// Last known foreground process name, last write wins
///
/// Cloning is cheap and all clones share the value.
#[derive(Debug, Clone, Default)]
pub struct ForegroundProcess {
    name: Arc<RwLock<String>>,
}

impl ForegroundProcess {
    /// Current name, empty if unknown
    pub fn current(&self) -> String {
        self.name.read().clone()
    }

    /// Publish a new name; a trailing line break is stripped
    ///
    /// Returns whether the stored value changed.
    pub fn set(&self, name: &str) -> bool {
        let name = name.trim_end_matches(['\r', '\n']);
        let mut current = self.name.write();
        if *current == name {
            return false;
        }
        name.clone_into(&mut current);
        true
    }
}

/// Source of the foreground process name
pub trait ForegroundProbe: Send {
    /// Executable path or name of the foreground process, `None` if there is none
    fn foreground_process(&mut self) -> Result<Option<String>>;
}

/// Process monitor that polls the foreground process
pub struct ProcessMonitor<P: ForegroundProbe> {
    probe: P,
    cell: ForegroundProcess,
    interval: Duration,
}

/// Handle to a running monitor thread
pub struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Ask the thread to exit and wait for it
    ///
    /// The thread notices within one polling interval.
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.thread.join().is_err() {
            tracing::error!("Process monitor thread panicked");
        }
    }
}

impl<P: ForegroundProbe + 'static> ProcessMonitor<P> {
    /// Create a monitor publishing into `cell`
    pub fn new(probe: P, cell: ForegroundProcess, interval: Duration) -> Self {
        Self {
            probe,
            cell,
            interval,
        }
    }

    /// Query the probe once and publish the result
    ///
    /// Returns whether the published name changed. When no window has focus
    /// the previous name is kept.
    pub fn poll_once(&mut self) -> Result<bool> {
        let Some(path) = self.probe.foreground_process()? else {
            return Ok(false);
        };
        let name = extract_filename_without_extension(&path);
        if name.is_empty() {
            return Ok(false);
        }
        let changed = self.cell.set(name);
        if changed {
            tracing::debug!("Foreground process changed: {}", name);
        }
        Ok(changed)
    }

    /// Poll once and log the outcome
    ///
    /// A failure is logged at warn level only when its message differs from
    /// `last_error`; repeats drop to debug. Returns whether a warning was
    /// logged.
    fn poll_and_report(&mut self, last_error: &mut Option<String>) -> bool {
        match self.poll_once() {
            Ok(_) => {
                if last_error.take().is_some() {
                    tracing::info!("Foreground process polling recovered");
                }
                false
            }
            Err(e) => {
                let message = e.to_string();
                let repeated = last_error.as_deref() == Some(message.as_str());
                if repeated {
                    tracing::debug!("Error polling foreground process: {}", message);
                } else {
                    tracing::warn!("Error polling foreground process: {}", message);
                }
                *last_error = Some(message);
                !repeated
            }
        }
    }

    /// Start the monitoring thread
    pub fn start(mut self) -> MonitorHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let thread = thread::spawn(move || {
            tracing::info!("Process monitor started ({:?} interval)", self.interval);
            let mut last_error = None;
            while !stop_flag.load(Ordering::SeqCst) {
                self.poll_and_report(&mut last_error);
                thread::sleep(self.interval);
            }
            tracing::info!("Process monitor stopped");
        });
        MonitorHandle { stop, thread }
    }
}

/// Probe backed by the Win32 foreground window
#[cfg(windows)]
#[derive(Debug, Default)]
pub struct WindowsForegroundProbe;

#[cfg(windows)]
impl ForegroundProbe for WindowsForegroundProbe {
    /// # Safety
    ///
    /// `GetForegroundWindow` has no preconditions; a null handle is checked
    /// before use. `GetWindowThreadProcessId` writes one `u32` through a valid
    /// stack pointer. The process handle from `OpenProcess` is owned by
    /// `HandleGuard` and closed once. `QueryFullProcessImageNameW` receives the
    /// buffer length in `size` and never writes past it; `size` is updated to
    /// the number of characters written.
    #[expect(
        unsafe_code,
        reason = "Windows FFI for foreground window and process image name queries"
    )]
    fn foreground_process(&mut self) -> Result<Option<String>> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            return Ok(None);
        }

        let mut pid = 0u32;
        unsafe { GetWindowThreadProcessId(hwnd, Some(&raw mut pid)) };
        if pid == 0 {
            return Ok(None);
        }

        let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }?;
        let _guard = HandleGuard(handle);

        let mut buffer = [0u16; 1024];
        #[expect(
            clippy::cast_possible_truncation,
            reason = "buffer length is a small compile-time constant"
        )]
        let mut size = buffer.len() as u32;
        unsafe {
            QueryFullProcessImageNameW(
                handle,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &raw mut size,
            )
        }?;

        Ok(Some(String::from_utf16_lossy(&buffer[..size as usize])))
    }
}

/// Closes a process handle on drop
#[cfg(windows)]
struct HandleGuard(HANDLE);

#[cfg(windows)]
impl Drop for HandleGuard {
    #[expect(unsafe_code, reason = "Windows FFI for CloseHandle")]
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Probe for platforms without foreground window support
#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct UnsupportedForegroundProbe;

#[cfg(not(windows))]
impl ForegroundProbe for UnsupportedForegroundProbe {
    fn foreground_process(&mut self) -> Result<Option<String>> {
        Err(GestureError::ProcessMonitorError(StringError::new(
            "Foreground process detection is only supported on Windows",
        )))
    }
}

/// The probe for the current platform
#[cfg(windows)]
pub fn platform_probe() -> WindowsForegroundProbe {
    WindowsForegroundProbe
}

/// The probe for the current platform
#[cfg(not(windows))]
pub fn platform_probe() -> UnsupportedForegroundProbe {
    UnsupportedForegroundProbe
}

/// Extract the file name without extension, preserving case
///
/// Examples:
/// - "C:\\Windows\\System32\\notepad.exe" -> "notepad"
/// - "Code.exe" -> "Code"
/// - "/usr/bin/firefox" -> "firefox"
fn extract_filename_without_extension(path: &str) -> &str {
    let path = path.trim_end_matches(['\r', '\n']);
    let filename = path.rsplit(['\\', '/']).next().unwrap_or(path);
    match filename.rfind('.') {
        Some(pos) if pos > 0 => &filename[..pos],
        _ => filename,
    }
}

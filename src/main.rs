//! Awesome Hands - hand gesture shortcut dispatch
//!
//! Reads engine events as JSON lines on stdin and writes action requests as
//! JSON lines on stdout. The camera and classifier run in a separate process
//! that feeds stdin; a separate injector consumes stdout.

use anyhow::{Context, Result};
use awesome_hands::{
    actuator::JsonLinesActuator,
    config::{ConfigManager, ConfigStore},
    engine::{Delivery, EVENT_QUEUE_CAPACITY, EngineEvent, GestureEngine, offer_event},
    error::get_user_friendly_error,
    monitor::{ForegroundProcess, ProcessMonitor, platform_probe},
    utils,
};
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    utils::init_logging().context("Failed to initialize logging system")?;

    info!("Awesome Hands v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = match ConfigManager::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}", get_user_friendly_error(&e));
            return Err(e).context("Failed to load application configuration");
        }
    };
    info!(
        "Configuration loaded with {} application entries",
        settings.apps.len()
    );

    let config = ConfigStore::new(settings.apps);
    let foreground = ForegroundProcess::default();

    let monitor = ProcessMonitor::new(
        platform_probe(),
        foreground.clone(),
        Duration::from_millis(settings.monitoring_interval_ms),
    )
    .start();

    let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || read_events(tx))
        .context("Failed to spawn stdin reader thread")?;

    let actuator = JsonLinesActuator::new(std::io::stdout().lock());
    let mut engine = GestureEngine::new(config, foreground, settings.engine, actuator);
    engine.run(&rx);

    monitor.stop();
    info!("Awesome Hands exiting");
    Ok(())
}

/// Forward each stdin line as an engine event until stdin closes
fn read_events(tx: mpsc::SyncSender<EngineEvent>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EngineEvent>(&line) {
            Ok(event) => match offer_event(&tx, event) {
                Delivery::Queued => {}
                Delivery::Dropped => debug!("Engine busy, frame dropped"),
                Delivery::Disconnected => break,
            },
            Err(e) => warn!("Ignoring malformed event: {}", e),
        }
    }
    info!("Input stream closed");
}

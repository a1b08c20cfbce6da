mod alerts;
mod analyzer;
mod audio_stream;
mod baseline;
mod config;
mod engine;
mod gui;
mod history;
mod notifier;

use anyhow::Context;
use log::info;
use std::sync::{Arc, Mutex};

use crate::config::MonitorConfig;
use crate::engine::DetectionEngine;
use crate::history::{EventLog, SignalHistory};
use crate::notifier::{CommandNotifier, LogNotifier, Notifier};

const SETTINGS_PATH: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    // Invalid settings abort before any audio resource is acquired
    let config = MonitorConfig::load(SETTINGS_PATH).context("invalid configuration")?;

    // === Shared State ===
    let signal_history = Arc::new(Mutex::new(SignalHistory::new(config.graph_history_length)));
    let event_log = Arc::new(Mutex::new(EventLog::new(config.event_log_limit)));

    // === Notification Backend ===
    let notifier: Box<dyn Notifier> = match &config.notify_command {
        Some(command) => {
            Box::new(CommandNotifier::new(command).context("invalid notify_command")?)
        }
        None => Box::new(LogNotifier),
    };

    // === Detection Engine + Audio Capture ===
    let engine = DetectionEngine::new(
        &config,
        signal_history.clone(),
        event_log.clone(),
        notifier,
    );
    let capture =
        audio_stream::start_capture(&config, engine).context("failed to open audio input")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 640.0])
            .with_title("Loud Noise Monitor"),
        ..Default::default()
    };

    info!("Launching GUI...");
    eframe::run_native(
        "Loud Noise Monitor",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(gui::AppState::new(
                config,
                capture,
                signal_history,
                event_log,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("GUI error: {err}"))?;

    info!("Clean shutdown complete");
    Ok(())
}

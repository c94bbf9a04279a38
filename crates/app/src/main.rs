//! Lil Snippy - drag-select a screen region and read its text

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod display;
mod state;
mod worker;

use crate::app::{AppChannels, SnippyApp};
use crate::config::Config;
use crate::worker::{snip_worker, CancelToken, SnipCommand, SnipEvent, SnipPipeline};
use anyhow::Context as _;
use capture::{CaptureHistory, XcapScreen};
use crossbeam_channel::{bounded, Receiver, Sender};
use eframe::egui;
use ocr::OcrsRecognizer;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config_path = Config::path();
    let (config, config_error) = match config_path.as_deref().map(Config::load_from).transpose() {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_logging(&config.log_level);

    match (&config_path, config_error) {
        (_, Some(err)) => warn!(error = %err, path = ?config_path, "Failed to load config, using defaults"),
        (Some(path), None) if !path.exists() => {
            if let Err(err) = config.save_to(path) {
                warn!(error = %err, ?path, "Could not write default config");
            }
        }
        _ => {}
    }

    let history = CaptureHistory::new(config.capture_dir.clone());
    let recognizer = OcrsRecognizer::new(config.model_dir());
    if !recognizer.models_present() {
        warn!(
            model_dir = %recognizer.model_dir().display(),
            "OCR models not found; place text-detection.rten and text-recognition.rten there"
        );
    }
    info!(capture_dir = %history.dir().display(), "Starting Lil Snippy");

    let pipeline = SnipPipeline::new(XcapScreen::new(), recognizer, history, config.settle_delay());

    // Create capture worker channels
    let (cmd_tx, cmd_rx): (Sender<SnipCommand>, Receiver<SnipCommand>) = bounded(1);
    let (event_tx, event_rx): (Sender<SnipEvent>, Receiver<SnipEvent>) = bounded(4);
    let cancel = CancelToken::new();
    let repaint: Arc<OnceCell<egui::Context>> = Arc::new(OnceCell::new());

    // Start capture worker thread
    let worker_handle = {
        let cancel = cancel.clone();
        let repaint = repaint.clone();
        thread::Builder::new()
            .name("snip-worker".to_string())
            .spawn(move || snip_worker(pipeline, cmd_rx, event_tx, cancel, repaint))
            .context("Failed to spawn snip worker")?
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size())
            .with_min_inner_size([320.0, 240.0])
            .with_title("Lil Snippy")
            .with_transparent(true)
            .with_resizable(true),
        ..Default::default()
    };

    let channels = AppChannels {
        cmd_tx: cmd_tx.clone(),
        event_rx,
        cancel: cancel.clone(),
    };
    let result = eframe::run_native(
        "Lil Snippy",
        native_options,
        Box::new(move |cc| {
            let _ = repaint.set(cc.egui_ctx.clone());
            Ok(Box::new(SnippyApp::new(cc, &config, channels)))
        }),
    );

    // Cleanup
    cancel.cancel();
    let _ = cmd_tx.send(SnipCommand::Shutdown);
    if worker_handle.join().is_err() {
        error!("Snip worker panicked");
    }

    result.map_err(|err| anyhow::anyhow!("Window system error: {err}"))
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

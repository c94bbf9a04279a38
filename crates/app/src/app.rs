//! Main window using egui

use crate::config::Config;
use crate::display::{DisplayKind, TextDisplay};
use crate::state::{AppState, StateMachine};
use crate::worker::{CancelToken, SnipCommand, SnipEvent};
use capture::{CaptureHistory, Rect};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use eframe::egui;
use overlay::{OverlaySurface, SelectionOutcome};
use std::fs;
use tracing::{debug, info, warn};

/// Everything the window needs from `main`
pub struct AppChannels {
    pub cmd_tx: Sender<SnipCommand>,
    pub event_rx: Receiver<SnipEvent>,
    pub cancel: CancelToken,
}

/// Main application using egui
pub struct SnippyApp {
    state_machine: StateMachine,
    overlay: OverlaySurface,
    display: TextDisplay,
    status_text: String,
    history: CaptureHistory,
    snip_count: usize,
    clipboard: Option<arboard::Clipboard>,
    cmd_tx: Sender<SnipCommand>,
    event_rx: Receiver<SnipEvent>,
    cancel: CancelToken,
}

impl SnippyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &Config, channels: AppChannels) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let history = CaptureHistory::new(config.capture_dir.clone());
        let snip_count = history.count().unwrap_or_else(|err| {
            warn!(error = %err, dir = %history.dir().display(), "Cannot read capture history");
            0
        });

        Self {
            state_machine: StateMachine::new(),
            overlay: OverlaySurface::new(config.min_selection_size, config.overlay_opacity()),
            display: TextDisplay::new(),
            status_text: AppState::Idle.display_text().to_string(),
            history,
            snip_count,
            clipboard: None,
            cmd_tx: channels.cmd_tx,
            event_rx: channels.event_rx,
            cancel: channels.cancel,
        }
    }

    fn on_snip_click(&mut self, ctx: &egui::Context) {
        if !self.state_machine.start_selecting() {
            return;
        }
        self.status_text = AppState::Selecting.display_text().to_string();
        self.overlay.enter(ctx);
    }

    fn on_selection(&mut self, ctx: &egui::Context, outcome: SelectionOutcome) {
        match outcome {
            SelectionOutcome::Region(rect) => self.request_capture(ctx, rect),
            SelectionOutcome::TooSmall(rect) => {
                debug!(width = rect.width, height = rect.height, "Selection below minimum size");
                self.leave_overlay(ctx);
                self.state_machine.cancel_selecting();
                self.status_text = format!(
                    "Selection too small ({}x{}), drag a larger region",
                    rect.width, rect.height
                );
            }
            SelectionOutcome::Cancelled => {
                self.leave_overlay(ctx);
                self.state_machine.cancel_selecting();
                self.status_text = "Cancelled".to_string();
            }
        }
    }

    fn request_capture(&mut self, ctx: &egui::Context, rect: Rect) {
        let Some(id) = self.state_machine.start_capturing(rect).map(|s| s.id) else {
            return;
        };
        self.status_text = AppState::Capturing.display_text().to_string();

        match self.cmd_tx.try_send(SnipCommand::Capture { id, rect }) {
            Ok(()) => debug!(id, "Capture requested"),
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                warn!(id, "Snip worker unavailable");
                self.leave_overlay(ctx);
                self.state_machine.reset();
                self.status_text = "Capture failed".to_string();
                self.display.show_message("Capture failed: worker unavailable");
            }
        }
    }

    fn leave_overlay(&mut self, ctx: &egui::Context) {
        if self.state_machine.state().is_overlay() {
            self.overlay.exit(ctx);
        }
    }

    /// Apply worker results; the only place recognized text reaches the widget
    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_rx.try_recv() {
            let was_overlay = self.state_machine.state().is_overlay();

            match event {
                SnipEvent::Captured { id, path, width, height } => {
                    if self.state_machine.capture_finished(id, path) {
                        self.restore_window(ctx, was_overlay);
                        self.snip_count += 1;
                        self.status_text = format!(
                            "{} ({}x{})",
                            AppState::Recognizing.display_text(),
                            width,
                            height
                        );
                    }
                }
                SnipEvent::Recognized { id, text } => {
                    if let Some(session) = self.state_machine.finish(id) {
                        self.restore_window(ctx, was_overlay);
                        self.status_text = format!(
                            "Done in {} ms",
                            session.started.elapsed().as_millis()
                        );
                        self.display.show_text(text);
                    }
                }
                SnipEvent::Failed { id, error } => {
                    if self.state_machine.finish(id).is_some() {
                        self.restore_window(ctx, was_overlay);
                        let message = error.user_message();
                        debug!(id, %error, "Snip failed");
                        self.status_text = message.clone();
                        self.display.show_message(message);
                    }
                }
            }
        }
    }

    fn restore_window(&mut self, ctx: &egui::Context, was_overlay: bool) {
        if was_overlay {
            self.overlay.exit(ctx);
        }
    }

    fn copy_text(&mut self) {
        let text = self.display.text().to_string();
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text),
            None => arboard::Clipboard::new().and_then(|mut clipboard| {
                clipboard.set_text(text)?;
                self.clipboard = Some(clipboard);
                Ok(())
            }),
        };

        match result {
            Ok(()) => self.status_text = "Copied to clipboard".to_string(),
            Err(err) => {
                warn!(error = %err, "Clipboard unavailable");
                self.status_text = format!("Copy failed: {err}");
            }
        }
    }

    fn save_text(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text", &["txt"])
            .set_file_name("snip.txt")
            .save_file()
        else {
            return;
        };

        match fs::write(&path, self.display.text()) {
            Ok(()) => {
                info!(path = %path.display(), "Text saved");
                self.status_text = format!("Saved: {}", path.display());
            }
            Err(err) => {
                warn!(error = %err, path = %path.display(), "Saving text failed");
                self.status_text = format!("Save failed: {err}");
            }
        }
    }

    fn show_main(&mut self, ctx: &egui::Context) {
        let app_state = self.state_machine.state();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(
                    egui::RichText::new("✂ Lil Snippy")
                        .size(28.0)
                        .color(egui::Color32::from_rgb(51, 51, 51)),
                );
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(12.0);

                let snip_btn = egui::Button::new(
                    egui::RichText::new("Snip")
                        .size(16.0)
                        .color(egui::Color32::WHITE),
                )
                .fill(if app_state.can_snip() {
                    egui::Color32::from_rgb(40, 167, 69) // Green
                } else {
                    egui::Color32::from_rgb(108, 117, 125) // Gray
                })
                .min_size(egui::vec2(120.0, 45.0))
                .rounding(8.0);

                if ui.add_enabled(app_state.can_snip(), snip_btn).clicked() {
                    self.on_snip_click(ctx);
                }

                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    if matches!(app_state, AppState::Recognizing | AppState::Capturing) {
                        ui.spinner();
                    }
                    let status_color = match (app_state, self.display.kind()) {
                        (AppState::Recognizing, _) => egui::Color32::from_rgb(0, 136, 255), // Blue
                        (AppState::Idle, DisplayKind::Message) => egui::Color32::from_rgb(220, 53, 69), // Red
                        _ => egui::Color32::from_rgb(102, 102, 102), // Gray
                    };
                    ui.label(egui::RichText::new(&self.status_text).size(15.0).color(status_color));
                });
            });

            ui.add_space(12.0);

            let has_text = self.display.has_text();
            ui.horizontal(|ui| {
                if ui.add_enabled(has_text, egui::Button::new("Copy")).clicked() {
                    self.copy_text();
                }
                if ui.add_enabled(has_text, egui::Button::new("Save…")).clicked() {
                    self.save_text();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} snips in {}",
                            self.snip_count,
                            self.history.dir().display()
                        ))
                        .size(12.0)
                        .color(egui::Color32::from_rgb(136, 136, 136)),
                    );
                });
            });

            ui.add_space(6.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(self.display.text_mut())
                        .desired_width(f32::INFINITY)
                        .desired_rows(12)
                        .hint_text("Recognized text appears here"),
                );
            });
        });
    }
}

impl eframe::App for SnippyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.cancel.cancel();
        }

        self.drain_events(ctx);

        match self.state_machine.state() {
            AppState::Selecting => {
                if let Some(outcome) = self.overlay.show(ctx) {
                    self.on_selection(ctx, outcome);
                }
            }
            AppState::Capturing => self.overlay.show_cleared(ctx),
            AppState::Idle | AppState::Recognizing => self.show_main(ctx),
        }
    }

    /// The viewport is transparent so the overlay can dim the screen; the
    /// normal window paints its own opaque panel.
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

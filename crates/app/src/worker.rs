//! Capture worker: grab, persist and recognize off the UI thread

use capture::{CaptureError, CaptureHistory, CapturedImage, Rect, ScreenSource};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use ocr::{join_lines, OcrError, TextRecognizer};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};

/// Capture worker commands
#[derive(Debug)]
pub enum SnipCommand {
    Capture { id: u64, rect: Rect },
    Shutdown,
}

/// Capture worker results
#[derive(Debug)]
pub enum SnipEvent {
    /// Region grabbed and saved; OCR is next
    Captured {
        id: u64,
        path: PathBuf,
        width: u32,
        height: u32,
    },
    Recognized { id: u64, text: String },
    Failed { id: u64, error: SnipError },
}

#[derive(Error, Debug)]
pub enum SnipError {
    #[error("Capture failed: {0}")]
    CaptureFailed(#[source] CaptureError),

    #[error("Could not save the snip: {0}")]
    PersistFailed(#[source] CaptureError),

    #[error("Text recognition failed: {0}")]
    RecognitionFailed(#[from] OcrError),

    #[error("No text found")]
    NoText,

    #[error("Cancelled")]
    Cancelled,
}

impl SnipError {
    /// Short text for the display area
    pub fn user_message(&self) -> String {
        match self {
            SnipError::CaptureFailed(CaptureError::EmptyRegion(_)) => {
                "Nothing to capture: the selection is empty".to_string()
            }
            SnipError::CaptureFailed(CaptureError::OutOfBounds(_)) => {
                "Nothing to capture: the selection is off screen".to_string()
            }
            SnipError::RecognitionFailed(OcrError::ModelMissing(path)) => {
                format!("OCR model missing: {}", path.display())
            }
            other => other.to_string(),
        }
    }
}

/// Shared flag telling the worker to drop what it is doing
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SnipError> {
        if self.is_cancelled() {
            Err(SnipError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Capture, persist, recognize
pub struct SnipPipeline<S, R> {
    screen: S,
    recognizer: R,
    history: CaptureHistory,
    settle_delay: Duration,
}

impl<S: ScreenSource, R: TextRecognizer> SnipPipeline<S, R> {
    pub fn new(screen: S, recognizer: R, history: CaptureHistory, settle_delay: Duration) -> Self {
        Self {
            screen,
            recognizer,
            history,
            settle_delay,
        }
    }

    /// Run one snip. `on_captured` fires after the image is saved and before OCR.
    pub fn run(
        &self,
        rect: Rect,
        cancel: &CancelToken,
        on_captured: impl FnOnce(&CapturedImage),
    ) -> Result<String, SnipError> {
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        cancel.check()?;

        let image = self.screen.capture(rect).map_err(SnipError::CaptureFailed)?;
        cancel.check()?;

        let path = self.history.save(&image).map_err(SnipError::PersistFailed)?;
        let captured = CapturedImage {
            image,
            path,
            region: rect,
        };
        on_captured(&captured);
        cancel.check()?;

        let lines = self.recognizer.recognize(&captured.image)?;
        cancel.check()?;

        let text = join_lines(&lines);
        if text.is_empty() {
            return Err(SnipError::NoText);
        }
        Ok(text)
    }
}

/// Worker loop; runs until `Shutdown` or the command channel closes
pub fn snip_worker<S: ScreenSource, R: TextRecognizer>(
    pipeline: SnipPipeline<S, R>,
    cmd_rx: Receiver<SnipCommand>,
    event_tx: Sender<SnipEvent>,
    cancel: CancelToken,
    repaint: Arc<OnceCell<egui::Context>>,
) {
    info!(capture_dir = %pipeline.history.dir().display(), "Snip worker started");

    let notify = |event: SnipEvent| {
        if event_tx.send(event).is_err() {
            debug!("UI gone, dropping snip event");
        }
        if let Some(ctx) = repaint.get() {
            ctx.request_repaint();
        }
    };

    while let Ok(command) = cmd_rx.recv() {
        match command {
            SnipCommand::Capture { id, rect } => {
                let started = Instant::now();
                info!(id, x = rect.x, y = rect.y, width = rect.width, height = rect.height, "Snip requested");

                let result = pipeline.run(rect, &cancel, |captured| {
                    let (width, height) = captured.dimensions();
                    info!(id, path = %captured.path.display(), width, height, "Snip captured");
                    notify(SnipEvent::Captured {
                        id,
                        path: captured.path.clone(),
                        width,
                        height,
                    });
                });

                let elapsed_ms = started.elapsed().as_millis() as u64;
                match result {
                    Ok(text) => {
                        info!(id, chars = text.len(), elapsed_ms, "Snip recognized");
                        notify(SnipEvent::Recognized { id, text });
                    }
                    Err(SnipError::Cancelled) => {
                        debug!(id, "Snip cancelled");
                    }
                    Err(err) => {
                        error!(id, error = %err, elapsed_ms, "Snip failed");
                        notify(SnipEvent::Failed { id, error: err });
                    }
                }
            }
            SnipCommand::Shutdown => break,
        }
    }

    info!("Snip worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{crop_region, CaptureResult};
    use crossbeam_channel::bounded;
    use image::{Rgba, RgbaImage};
    use ocr::OcrResult;
    use std::fs;

    /// 640x480 screen with a gradient
    struct FakeScreen;

    impl ScreenSource for FakeScreen {
        fn capture(&self, rect: Rect) -> CaptureResult<RgbaImage> {
            let frame = RgbaImage::from_fn(640, 480, |x, y| Rgba([x as u8, y as u8, 0, 255]));
            crop_region(&frame, (0, 0), rect)
        }
    }

    enum FakeRecognizer {
        Lines(Vec<&'static str>),
        Broken,
    }

    impl TextRecognizer for FakeRecognizer {
        fn recognize(&self, _image: &RgbaImage) -> OcrResult<Vec<String>> {
            match self {
                FakeRecognizer::Lines(lines) => Ok(lines.iter().map(|l| l.to_string()).collect()),
                FakeRecognizer::Broken => Err(OcrError::Input("broken".into())),
            }
        }
    }

    fn scratch_history() -> CaptureHistory {
        CaptureHistory::new(
            std::env::temp_dir().join(format!("lil_snippy_worker_{}", uuid::Uuid::new_v4())),
        )
    }

    fn pipeline(recognizer: FakeRecognizer) -> SnipPipeline<FakeScreen, FakeRecognizer> {
        SnipPipeline::new(FakeScreen, recognizer, scratch_history(), Duration::ZERO)
    }

    #[test]
    fn captured_image_matches_region() {
        let pipeline = pipeline(FakeRecognizer::Lines(vec!["Hello", "world"]));
        let mut seen = None;

        let text = pipeline
            .run(Rect::new(20, 30, 120, 45), &CancelToken::new(), |captured| {
                seen = Some((captured.dimensions(), captured.path.clone()));
            })
            .unwrap();

        assert_eq!(text, "Hello\nworld");
        let (dims, path) = seen.unwrap();
        assert_eq!(dims, (120, 45));
        assert_eq!(image::open(&path).unwrap().to_rgba8().dimensions(), (120, 45));
        fs::remove_dir_all(pipeline.history.dir()).ok();
    }

    #[test]
    fn empty_recognition_is_no_text() {
        let pipeline = pipeline(FakeRecognizer::Lines(vec!["", "   "]));
        let err = pipeline
            .run(Rect::new(0, 0, 10, 10), &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, SnipError::NoText));
        assert_eq!(err.to_string(), "No text found");
        fs::remove_dir_all(pipeline.history.dir()).ok();
    }

    #[test]
    fn engine_fault_is_recognition_failed() {
        let pipeline = pipeline(FakeRecognizer::Broken);
        let err = pipeline
            .run(Rect::new(0, 0, 10, 10), &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, SnipError::RecognitionFailed(_)));
        fs::remove_dir_all(pipeline.history.dir()).ok();
    }

    #[test]
    fn zero_area_region_is_capture_failed() {
        let pipeline = pipeline(FakeRecognizer::Lines(vec!["unused"]));
        let mut captured = false;
        let err = pipeline
            .run(Rect::new(50, 50, 0, 0), &CancelToken::new(), |_| captured = true)
            .unwrap_err();
        assert!(matches!(err, SnipError::CaptureFailed(CaptureError::EmptyRegion(_))));
        assert!(!captured);
        assert_eq!(pipeline.history.count().unwrap(), 0);
    }

    #[test]
    fn unwritable_history_is_persist_failed() {
        let blocker = std::env::temp_dir().join(format!("lil_snippy_blocker_{}", uuid::Uuid::new_v4()));
        fs::write(&blocker, b"file, not a directory").unwrap();
        let pipeline = SnipPipeline::new(
            FakeScreen,
            FakeRecognizer::Lines(vec!["unused"]),
            CaptureHistory::new(blocker.join("snips")),
            Duration::ZERO,
        );

        let err = pipeline
            .run(Rect::new(0, 0, 10, 10), &CancelToken::new(), |_| {})
            .unwrap_err();
        assert!(matches!(err, SnipError::PersistFailed(_)));
        fs::remove_file(&blocker).ok();
    }

    #[test]
    fn cancelled_token_stops_before_capture() {
        let pipeline = pipeline(FakeRecognizer::Lines(vec!["text"]));
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = pipeline.run(Rect::new(0, 0, 10, 10), &cancel, |_| {}).unwrap_err();
        assert!(matches!(err, SnipError::Cancelled));
        assert_eq!(pipeline.history.count().unwrap(), 0);
    }

    #[test]
    fn worker_reports_capture_then_text() {
        let history_dir = scratch_history().dir().to_path_buf();
        let pipeline = SnipPipeline::new(
            FakeScreen,
            FakeRecognizer::Lines(vec!["line one", "line two"]),
            CaptureHistory::new(&history_dir),
            Duration::ZERO,
        );
        let (cmd_tx, cmd_rx) = bounded(1);
        let (event_tx, event_rx) = bounded(4);

        let handle = thread::spawn(move || {
            snip_worker(pipeline, cmd_rx, event_tx, CancelToken::new(), Arc::new(OnceCell::new()));
        });

        cmd_tx.send(SnipCommand::Capture { id: 7, rect: Rect::new(0, 0, 64, 32) }).unwrap();
        cmd_tx.send(SnipCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events: Vec<SnipEvent> = event_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            SnipEvent::Captured { id, path, width, height } => {
                assert_eq!((*id, *width, *height), (7, 64, 32));
                assert!(path.exists());
            }
            other => panic!("expected Captured, got {other:?}"),
        }
        match &events[1] {
            SnipEvent::Recognized { id, text } => {
                assert_eq!(*id, 7);
                assert_eq!(text, "line one\nline two");
            }
            other => panic!("expected Recognized, got {other:?}"),
        }
        fs::remove_dir_all(&history_dir).ok();
    }

    #[test]
    fn worker_reports_failure_as_event() {
        let pipeline = pipeline(FakeRecognizer::Broken);
        let history_dir = pipeline.history.dir().to_path_buf();
        let (cmd_tx, cmd_rx) = bounded(1);
        let (event_tx, event_rx) = bounded(4);

        let handle = thread::spawn(move || {
            snip_worker(pipeline, cmd_rx, event_tx, CancelToken::new(), Arc::new(OnceCell::new()));
        });
        cmd_tx.send(SnipCommand::Capture { id: 1, rect: Rect::new(0, 0, 8, 8) }).unwrap();
        drop(cmd_tx);
        handle.join().unwrap();

        let last = event_rx.try_iter().last();
        assert!(matches!(
            last,
            Some(SnipEvent::Failed { id: 1, error: SnipError::RecognitionFailed(_) })
        ));
        fs::remove_dir_all(&history_dir).ok();
    }

    #[test]
    fn user_message_names_missing_model() {
        let err = SnipError::RecognitionFailed(OcrError::ModelMissing(PathBuf::from(
            "models/text-detection.rten",
        )));
        assert!(err.user_message().contains("text-detection.rten"));
        assert_eq!(SnipError::NoText.user_message(), "No text found");
    }
}

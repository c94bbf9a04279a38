//! ocrs-backed recognizer

use crate::{OcrError, OcrResult, TextRecognizer};
use image::{DynamicImage, RgbaImage};
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use parking_lot::Mutex;
use rten::Model;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// File name of the text detection model inside the model directory
pub const DETECTION_MODEL: &str = "text-detection.rten";
/// File name of the text recognition model inside the model directory
pub const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Recognizer that loads its models on first use.
///
/// A failed load is not cached, so dropping the models into place and
/// snipping again is enough to recover.
pub struct OcrsRecognizer {
    model_dir: PathBuf,
    engine: Mutex<Option<OcrEngine>>,
}

impl OcrsRecognizer {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            engine: Mutex::new(None),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Both model files exist on disk
    pub fn models_present(&self) -> bool {
        self.model_dir.join(DETECTION_MODEL).is_file()
            && self.model_dir.join(RECOGNITION_MODEL).is_file()
    }

    fn load_model(path: &Path) -> OcrResult<Model> {
        if !path.is_file() {
            return Err(OcrError::ModelMissing(path.to_path_buf()));
        }
        Model::load_file(path).map_err(|err| OcrError::ModelLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn load_engine(&self) -> OcrResult<OcrEngine> {
        let started = Instant::now();
        let detection_model = Self::load_model(&self.model_dir.join(DETECTION_MODEL))?;
        let recognition_model = Self::load_model(&self.model_dir.join(RECOGNITION_MODEL))?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        info!(
            model_dir = %self.model_dir.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OCR engine loaded"
        );
        Ok(engine)
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &RgbaImage) -> OcrResult<Vec<String>> {
        let mut slot = self.engine.lock();
        let engine = match slot.take() {
            Some(engine) => engine,
            None => self.load_engine()?,
        };

        let lines = recognize_lines(&engine, image);
        *slot = Some(engine);
        lines
    }
}

fn recognize_lines(engine: &OcrEngine, image: &RgbaImage) -> OcrResult<Vec<String>> {
    let started = Instant::now();
    let rgb = DynamicImage::ImageRgba8(image.clone()).into_rgb8();
    let source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions())
        .map_err(|err| OcrError::Input(err.to_string()))?;

    let input = engine.prepare_input(source)?;
    let words = engine.detect_words(&input)?;
    let line_rects = engine.find_text_lines(&input, &words);
    let recognized = engine.recognize_text(&input, &line_rects)?;

    let lines: Vec<String> = recognized
        .iter()
        .flatten()
        .map(|line| line.to_string())
        .filter(|text| !text.trim().is_empty())
        .collect();

    debug!(
        words = words.len(),
        lines = lines.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Recognition finished"
    );
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn empty_model_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lil_snippy_models_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_models_are_reported_not_panicked() {
        let dir = empty_model_dir();
        let recognizer = OcrsRecognizer::new(&dir);
        assert!(!recognizer.models_present());

        let image = RgbaImage::from_pixel(32, 32, Rgba([255, 255, 255, 255]));
        let err = recognizer.recognize(&image).unwrap_err();
        match err {
            OcrError::ModelMissing(path) => assert!(path.ends_with(DETECTION_MODEL)),
            other => panic!("unexpected error: {other}"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_model_is_a_load_error() {
        let dir = empty_model_dir();
        std::fs::write(dir.join(DETECTION_MODEL), b"not a model").unwrap();
        std::fs::write(dir.join(RECOGNITION_MODEL), b"not a model").unwrap();

        let recognizer = OcrsRecognizer::new(&dir);
        assert!(recognizer.models_present());

        let image = RgbaImage::from_pixel(32, 32, Rgba([255, 255, 255, 255]));
        assert!(matches!(
            recognizer.recognize(&image),
            Err(OcrError::ModelLoad { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
